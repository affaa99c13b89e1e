use std::collections::HashMap;
use std::result::Result;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use super::{AbstractPaymentProcessor, AppProcessorError, WebhookSignatureVerifier};
use crate::model::{InvoiceCreateReqModel, ProcessorRawRespModel};

struct MockInvoice {
    amount: u64,
    currency: u16,
    reference: String,
}

/// In-process processor for test deployments, invoices are kept in memory
/// and stay in `created` status. Webhook signatures are still verified
/// with the configured public key.
pub(super) struct MockInvoiceProcessor {
    verifier: WebhookSignatureVerifier,
    num_created: AtomicU32,
    invoices: Mutex<HashMap<String, MockInvoice>>,
}

impl MockInvoiceProcessor {
    pub(super) fn new(verifier: WebhookSignatureVerifier) -> Self {
        Self {
            verifier,
            num_created: AtomicU32::new(0),
            invoices: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AbstractPaymentProcessor for MockInvoiceProcessor {
    async fn create_invoice(
        &self,
        req: &InvoiceCreateReqModel,
    ) -> Result<ProcessorRawRespModel, AppProcessorError> {
        let seq = self.num_created.fetch_add(1, Ordering::Relaxed) + 1;
        let invoice_id = format!("mock-inv-{seq:06}");
        let item = MockInvoice {
            amount: req.amount,
            currency: req.currency,
            reference: req.reference.clone(),
        };
        let mut guard = self.invoices.lock().await;
        let _old = guard.insert(invoice_id.clone(), item);
        let body = json!({
            "invoiceId": invoice_id,
            "pageUrl": format!("https://pay.mock.localhost/{invoice_id}"),
        });
        Ok(ProcessorRawRespModel {
            status_code: 200,
            body,
        })
    }

    async fn get_invoice_status(
        &self,
        invoice_id: &str,
    ) -> Result<ProcessorRawRespModel, AppProcessorError> {
        let guard = self.invoices.lock().await;
        let resp = match guard.get(invoice_id) {
            Some(item) => ProcessorRawRespModel {
                status_code: 200,
                body: json!({
                    "invoiceId": invoice_id,
                    "status": "created",
                    "amount": item.amount,
                    "ccy": item.currency,
                    "reference": item.reference,
                }),
            },
            None => ProcessorRawRespModel {
                status_code: 404,
                body: json!({"errCode": "NOT_FOUND", "errText": "invoice not found"}),
            },
        };
        Ok(resp)
    }

    fn verify_webhook_signature(
        &self,
        raw_body: &[u8],
        sign_b64: &str,
    ) -> Result<bool, AppProcessorError> {
        self.verifier.verify(raw_body, sign_b64)
    }
}
