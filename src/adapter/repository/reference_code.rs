use std::sync::Arc;

use chrono::{Duration, Local};
use rand::rngs::OsRng;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::AppRepoError;
use crate::adapter::cache::AbstractKeyValueCache;
use crate::model::ReferenceCodeModel;

const KEY_PREFIX: &str = "reference_code:";

pub struct ReferenceCodeRegistry {
    cache: Arc<Box<dyn AbstractKeyValueCache>>,
    ttl: Duration,
    logctx: Arc<AppLogContext>,
}

impl ReferenceCodeRegistry {
    pub fn new(
        cache: Arc<Box<dyn AbstractKeyValueCache>>,
        ttl: Duration,
        logctx: Arc<AppLogContext>,
    ) -> Self {
        Self { cache, ttl, logctx }
    }

    fn cache_key(code: &str) -> String {
        format!("{KEY_PREFIX}{code}")
    }

    /// Generate a code which is not reserved yet, then reserve it.
    ///
    /// The keyspace per month letter is 36^3, retry on every collision
    /// without upper bound.
    pub async fn generate(&self) -> Result<ReferenceCodeModel, AppRepoError> {
        let logctx_p = &self.logctx;
        let mut num_collisions = 0usize;
        loop {
            let code = ReferenceCodeModel::generate(&Local::now(), &mut OsRng);
            let key = Self::cache_key(code.as_str());
            let reserved = self
                .cache
                .set_if_absent(key.as_str(), b"true".to_vec(), self.ttl)
                .await?;
            if reserved {
                if num_collisions > 0 {
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::DEBUG,
                        "code:{code}, collisions:{num_collisions}"
                    );
                }
                break Ok(code);
            }
            num_collisions += 1;
            app_log_event!(logctx_p, AppLogLevel::DEBUG, "collision, code:{code}");
        }
    }

    /// no-op for empty or unreserved code
    pub async fn release(&self, code: &str) -> Result<(), AppRepoError> {
        if code.is_empty() {
            return Ok(());
        }
        let key = Self::cache_key(code);
        let _removed = self.cache.delete(key.as_str()).await?;
        Ok(())
    }

    pub async fn is_reserved(&self, code: &str) -> Result<bool, AppRepoError> {
        let key = Self::cache_key(code);
        let found = self.cache.get(key.as_str()).await?;
        Ok(found.is_some())
    }
} // end of impl ReferenceCodeRegistry
