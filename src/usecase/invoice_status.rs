use std::boxed::Box;
use std::sync::Arc;

use serde_json::Value as JsnVal;

use crate::adapter::processor::{AbstractPaymentProcessor, AppProcessorError};
use crate::api::web::dto::InvoiceStatusRespDto;

const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug)]
pub enum InvoiceStatusUcError {
    NotFound,
    ProcessorRejected { status_code: u16, body: JsnVal },
    ProcessorUnavailable(AppProcessorError),
}

impl From<AppProcessorError> for InvoiceStatusUcError {
    fn from(value: AppProcessorError) -> Self {
        Self::ProcessorUnavailable(value)
    }
}

pub struct InvoiceStatusUseCase {
    pub processor: Arc<Box<dyn AbstractPaymentProcessor>>,
}

impl InvoiceStatusUseCase {
    pub async fn execute(
        &self,
        invoice_id: String,
    ) -> Result<InvoiceStatusRespDto, InvoiceStatusUcError> {
        let resp = self.processor.get_invoice_status(invoice_id.as_str()).await?;
        match resp.status_code {
            200 => {
                let status = resp
                    .str_field("status")
                    .unwrap_or_else(|| UNKNOWN_STATUS.to_string());
                let currency = resp
                    .u64_field("ccy")
                    .and_then(|v| u16::try_from(v).ok());
                Ok(InvoiceStatusRespDto {
                    amount: resp.u64_field("amount"),
                    invoice_id,
                    status,
                    currency,
                })
            }
            404 => Err(InvoiceStatusUcError::NotFound),
            _others => Err(InvoiceStatusUcError::ProcessorRejected {
                status_code: resp.status_code,
                body: resp.body,
            }),
        }
    }
}
