use std::boxed::Box;
use std::sync::Arc;

use futures_util::future::join_all;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::notification::{AbstractNotificationSink, NotifyDeliveryResult};
use crate::adapter::processor::{AbstractPaymentProcessor, AppProcessorError};
use crate::adapter::repository::{
    NotifiedInvoiceMarker, PendingInvoiceStore, ReferenceCodeRegistry,
};
use crate::api::web::dto::InvoiceWebhookReqDto;
use crate::model::{AdminNotifyModel, InvoiceEventStatus, OrderPayloadModel};

#[derive(Debug)]
pub enum WebhookUcError {
    // no detail exposed to the caller
    InvalidSignature,
    // deployment error, public key of the processor is absent
    MissingPublicKey(AppProcessorError),
}

/// Outcome of a verified webhook. All variants are acknowledged to the
/// processor, retries are never requested.
#[derive(Debug)]
pub enum WebhookOutcome {
    Notified {
        degraded: bool,
        deliveries: Vec<NotifyDeliveryResult>,
    },
    DuplicateNotification,
    Released(Option<String>),
    Ignored(String),
}

pub struct InvoiceWebhookUseCase {
    pub processor: Arc<Box<dyn AbstractPaymentProcessor>>,
    pub notify_sink: Arc<Box<dyn AbstractNotificationSink>>,
    pub ref_registry: ReferenceCodeRegistry,
    pub pending_store: PendingInvoiceStore,
    pub notified_marker: NotifiedInvoiceMarker,
    pub admin_recipients: Vec<i64>,
    pub logctx: Arc<AppLogContext>,
}

impl InvoiceWebhookUseCase {
    pub async fn execute(
        &self,
        raw_body: &[u8],
        sign_b64: &str,
    ) -> Result<WebhookOutcome, WebhookUcError> {
        let logctx_p = &self.logctx;
        let verified = self
            .processor
            .verify_webhook_signature(raw_body, sign_b64)
            .map_err(|e| {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                WebhookUcError::MissingPublicKey(e)
            })?;
        if !verified {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "invalid-signature, body-size:{}",
                raw_body.len()
            );
            return Err(WebhookUcError::InvalidSignature);
        }
        let event = match serde_json::from_slice::<InvoiceWebhookReqDto>(raw_body) {
            Ok(v) => v,
            Err(e) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "malformed-body, {:?}", e);
                return Ok(WebhookOutcome::Ignored("malformed-body".to_string()));
            }
        };
        let status = InvoiceEventStatus::from(event.status.as_deref().unwrap_or(""));
        let outcome = match status {
            InvoiceEventStatus::Success => self.finalize_paid(&event).await,
            InvoiceEventStatus::Failure(label) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::INFO,
                    "invoice-failed, id:{:?}, status:{label}",
                    event.invoice_id.as_deref()
                );
                self.release_failed(&event).await
            }
            InvoiceEventStatus::Other(label) => WebhookOutcome::Ignored(label),
        };
        Ok(outcome)
    } // end of fn execute

    async fn finalize_paid(&self, event: &InvoiceWebhookReqDto) -> WebhookOutcome {
        let logctx_p = &self.logctx;
        let invoice_id = event.invoice_id.as_deref().unwrap_or("");
        if !invoice_id.is_empty() {
            match self.notified_marker.try_mark(invoice_id).await {
                Ok(true) => {}
                Ok(false) => {
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::INFO,
                        "duplicate-success, invoice:{invoice_id}"
                    );
                    return WebhookOutcome::DuplicateNotification;
                }
                Err(e) => {
                    app_log_event!(logctx_p, AppLogLevel::ERROR, "notified-marker, {:?}", e);
                }
            }
        }
        let cached = if invoice_id.is_empty() {
            None
        } else {
            self.pending_store
                .pop(invoice_id)
                .await
                .map_err(|e| {
                    app_log_event!(logctx_p, AppLogLevel::ERROR, "pending-store-pop, {:?}", e);
                })
                .ok()
                .flatten()
        };
        let degraded = cached.is_none();
        let payload = cached.unwrap_or_else(|| OrderPayloadModel::degraded(event));
        let msg = AdminNotifyModel::from(&payload);
        let deliveries = self.notify_all(&msg).await;
        let num_ok = deliveries.iter().filter(|d| d.delivered()).count();
        deliveries
            .iter()
            .filter_map(|d| d.outcome.as_ref().err().map(|e| (d.recipient, e)))
            .map(|(recipient, e)| {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "notify-failure, recipient:{recipient}, {:?}",
                    e.reason
                );
            })
            .count();
        app_log_event!(
            logctx_p,
            AppLogLevel::INFO,
            "invoice-paid, id:{invoice_id}, reference:{}, degraded:{degraded}, delivered:{num_ok}/{}",
            payload.reference.as_str(),
            deliveries.len()
        );
        WebhookOutcome::Notified {
            degraded,
            deliveries,
        }
    } // end of fn finalize_paid

    async fn notify_all(&self, msg: &AdminNotifyModel) -> Vec<NotifyDeliveryResult> {
        let futs = self.admin_recipients.iter().map(|recipient| async move {
            let outcome = self.notify_sink.send(*recipient, msg).await;
            NotifyDeliveryResult {
                recipient: *recipient,
                outcome,
            }
        });
        join_all(futs).await
    }

    async fn release_failed(&self, event: &InvoiceWebhookReqDto) -> WebhookOutcome {
        let logctx_p = &self.logctx;
        let invoice_id = event.invoice_id.as_deref().unwrap_or("");
        let payload = if invoice_id.is_empty() {
            None
        } else {
            self.pending_store
                .pop(invoice_id)
                .await
                .map_err(|e| {
                    app_log_event!(logctx_p, AppLogLevel::ERROR, "pending-store-pop, {:?}", e);
                })
                .ok()
                .flatten()
        };
        let code = match payload {
            Some(p) => p.reference,
            None => match self.reserved_webhook_reference(event).await {
                Some(c) => c,
                None => return WebhookOutcome::Released(None),
            },
        };
        match self.ref_registry.release(code.as_str()).await {
            Ok(()) => WebhookOutcome::Released(Some(code)),
            Err(e) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::ERROR,
                    "reference-release, code:{code}, {:?}",
                    e
                );
                WebhookOutcome::Released(None)
            }
        }
    } // end of fn release_failed

    // pending payload is gone, the code echoed by the processor is
    // released only while it is still reserved
    async fn reserved_webhook_reference(&self, event: &InvoiceWebhookReqDto) -> Option<String> {
        let logctx_p = &self.logctx;
        let code = OrderPayloadModel::webhook_reference(event)?;
        match self.ref_registry.is_reserved(code.as_str()).await {
            Ok(true) => Some(code.into_string()),
            Ok(false) => None,
            Err(e) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::ERROR,
                    "reference-lookup, code:{code}, {:?}",
                    e
                );
                None
            }
        }
    }
} // end of impl InvoiceWebhookUseCase
