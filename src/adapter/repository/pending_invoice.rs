use std::sync::Arc;

use chrono::Duration;

use super::{AppRepoError, AppRepoErrorReason};
use crate::adapter::cache::AbstractKeyValueCache;
use crate::model::OrderPayloadModel;

pub struct PendingInvoiceStore {
    cache: Arc<Box<dyn AbstractKeyValueCache>>,
    ttl: Duration,
}

impl PendingInvoiceStore {
    pub fn new(cache: Arc<Box<dyn AbstractKeyValueCache>>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn cache_key(invoice_id: &str) -> String {
        format!("invoice:{invoice_id}")
    }

    pub async fn put(
        &self,
        invoice_id: &str,
        payload: &OrderPayloadModel,
    ) -> Result<(), AppRepoError> {
        let serial = serde_json::to_vec(payload).map_err(|e| AppRepoError {
            reason: AppRepoErrorReason::SerialiseFailure(e.to_string()),
        })?;
        let key = Self::cache_key(invoice_id);
        self.cache.set(key.as_str(), serial, self.ttl).await?;
        Ok(())
    }

    /// Read and delete the payload at once. Subsequent calls with the same
    /// invoice ID return `None`.
    pub async fn pop(&self, invoice_id: &str) -> Result<Option<OrderPayloadModel>, AppRepoError> {
        let key = Self::cache_key(invoice_id);
        let raw = match self.cache.take(key.as_str()).await? {
            Some(v) => v,
            None => return Ok(None),
        };
        serde_json::from_slice::<OrderPayloadModel>(&raw)
            .map(Some)
            .map_err(|e| AppRepoError {
                reason: AppRepoErrorReason::CorruptedPayload(e.to_string()),
            })
    }
} // end of impl PendingInvoiceStore

/// remembers invoices whose payment success has been notified to admins,
/// so that retried webhooks from the processor are not notified twice
pub struct NotifiedInvoiceMarker {
    cache: Arc<Box<dyn AbstractKeyValueCache>>,
    ttl: Duration,
}

impl NotifiedInvoiceMarker {
    pub fn new(cache: Arc<Box<dyn AbstractKeyValueCache>>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// returns `false` if the invoice was already marked
    pub async fn try_mark(&self, invoice_id: &str) -> Result<bool, AppRepoError> {
        let key = format!("notified:{invoice_id}");
        let marked = self
            .cache
            .set_if_absent(key.as_str(), b"true".to_vec(), self.ttl)
            .await?;
        Ok(marked)
    }
}
