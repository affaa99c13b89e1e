mod in_mem;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result;

use async_trait::async_trait;
use chrono::Duration;

use storefront_common::config::AppCacheCfg;

pub use in_mem::InMemKeyValueCache;

#[derive(Debug, PartialEq)]
pub enum AppCacheErrorReason {
    ExceedCapacity(u32),
    InvalidTtl(i64),
}

#[derive(Debug)]
pub struct AppCacheError {
    pub reason: AppCacheErrorReason,
}

/// Key/value store with expiry, each operation is atomic with respect to
/// a single key, no multi-key transaction is provided.
#[async_trait]
pub trait AbstractKeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppCacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), AppCacheError>;

    /// store the value only if the key is absent (or expired), returns
    /// `true` if the value has been stored by this call
    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<bool, AppCacheError>;

    /// returns `true` if there was a live entry removed
    async fn delete(&self, key: &str) -> Result<bool, AppCacheError>;

    /// read then delete in one step
    async fn take(&self, key: &str) -> Result<Option<Vec<u8>>, AppCacheError>;
}

// TODO, add Redis variant so multiple service instances share reservations
pub fn app_cache_context(cfg: &AppCacheCfg) -> Box<dyn AbstractKeyValueCache> {
    match cfg {
        AppCacheCfg::InMemory { alias: _, max_items } => {
            let c = InMemKeyValueCache::new(*max_items);
            Box::new(c)
        }
    }
}
