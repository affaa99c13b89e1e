mod pending_invoice;
mod reference_code;

pub use pending_invoice::{NotifiedInvoiceMarker, PendingInvoiceStore};
pub use reference_code::ReferenceCodeRegistry;

use crate::adapter::cache::AppCacheError;

#[derive(Debug)]
pub enum AppRepoErrorReason {
    Cache(AppCacheError),
    CorruptedPayload(String),
    SerialiseFailure(String),
}

#[derive(Debug)]
pub struct AppRepoError {
    pub reason: AppRepoErrorReason,
}

impl From<AppCacheError> for AppRepoError {
    fn from(value: AppCacheError) -> Self {
        Self {
            reason: AppRepoErrorReason::Cache(value),
        }
    }
}
