use std::boxed::Box;
use std::sync::Arc;

use serde_json::Value as JsnVal;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::processor::{AbstractPaymentProcessor, AppProcessorError};
use crate::adapter::repository::{AppRepoError, PendingInvoiceStore, ReferenceCodeRegistry};
use crate::api::web::dto::{CreateInvoiceErrorDto, CreateInvoiceReqDto, CreateInvoiceRespDto};
use crate::model::{
    InvoiceCreateReqModel, OrderFormModel, OrderPayloadModel, ProcessorRawRespModel,
};

// some processors respond with either of them on creation
const ACCEPTED_STATUS_CODES: [u16; 2] = [200, 201];

#[derive(Debug)]
pub enum CreateInvoiceUcError {
    ClientBadRequest(CreateInvoiceErrorDto), // status code 400
    ReservationUnavailable(AppRepoError),
    // processor responded but not accepted, raw body kept for diagnosis
    ProcessorRejected { status_code: u16, body: JsnVal },
    ProcessorUnavailable(AppProcessorError),
}

impl From<CreateInvoiceErrorDto> for CreateInvoiceUcError {
    fn from(value: CreateInvoiceErrorDto) -> Self {
        Self::ClientBadRequest(value)
    }
}
impl From<AppRepoError> for CreateInvoiceUcError {
    fn from(value: AppRepoError) -> Self {
        Self::ReservationUnavailable(value)
    }
}
impl From<AppProcessorError> for CreateInvoiceUcError {
    fn from(value: AppProcessorError) -> Self {
        Self::ProcessorUnavailable(value)
    }
}

pub struct CreateInvoiceUseCase {
    pub processor: Arc<Box<dyn AbstractPaymentProcessor>>,
    pub ref_registry: ReferenceCodeRegistry,
    pub pending_store: PendingInvoiceStore,
    pub logctx: Arc<AppLogContext>,
}

impl CreateInvoiceUseCase {
    pub async fn execute(
        &self,
        req_body: CreateInvoiceReqDto,
    ) -> Result<CreateInvoiceRespDto, CreateInvoiceUcError> {
        let form = OrderFormModel::try_from(req_body)?;
        let reference = self.ref_registry.generate().await?;
        let payload = OrderPayloadModel::new(form, reference.into_string());
        let proc_req = InvoiceCreateReqModel::from(&payload);
        let result = self.processor.create_invoice(&proc_req).await;
        let (invoice_id, page_url) = match self.check_accepted(result) {
            Ok(v) => v,
            Err(e) => {
                self.release_reference(payload.reference.as_str()).await;
                return Err(e);
            }
        };
        if let Err(e) = self.pending_store.put(invoice_id.as_str(), &payload).await {
            // webhook handling falls back to degraded payload for this invoice
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "pending-store-write, invoice:{invoice_id}, {:?}",
                e
            );
        }
        Ok(CreateInvoiceRespDto {
            invoice_id,
            page_url,
            reference: payload.reference,
        })
    } // end of fn execute

    fn check_accepted(
        &self,
        result: Result<ProcessorRawRespModel, AppProcessorError>,
    ) -> Result<(String, String), CreateInvoiceUcError> {
        let logctx_p = &self.logctx;
        let resp = result?;
        if !ACCEPTED_STATUS_CODES.contains(&resp.status_code) {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "processor-rejected, status:{}, body:{}",
                resp.status_code,
                resp.body
            );
            return Err(CreateInvoiceUcError::ProcessorRejected {
                status_code: resp.status_code,
                body: resp.body,
            });
        }
        match (resp.str_field("invoiceId"), resp.str_field("pageUrl")) {
            (Some(id), Some(url)) if !id.is_empty() => Ok((id, url)),
            _others => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "processor-incomplete-resp, body:{}",
                    resp.body
                );
                Err(CreateInvoiceUcError::ProcessorRejected {
                    status_code: resp.status_code,
                    body: resp.body,
                })
            }
        }
    } // end of fn check_accepted

    async fn release_reference(&self, code: &str) {
        if let Err(e) = self.ref_registry.release(code).await {
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "reference-release, code:{code}, {:?}",
                e
            );
        }
    }
} // end of impl CreateInvoiceUseCase
