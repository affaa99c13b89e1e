use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::{AbstractKeyValueCache, AppCacheError, AppCacheErrorReason};

struct CacheEntry {
    value: Vec<u8>,
    expiry: DateTime<Utc>,
}

impl CacheEntry {
    fn alive(&self, now: DateTime<Utc>) -> bool {
        self.expiry > now
    }
}

/// Entries are evicted lazily, either on access after expiry or when
/// the cache reaches its capacity.
pub struct InMemKeyValueCache {
    max_items: u32,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemKeyValueCache {
    pub fn new(max_items: u32) -> Self {
        Self {
            max_items,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn check_ttl(ttl: Duration) -> Result<(), AppCacheError> {
        if ttl <= Duration::zero() {
            Err(AppCacheError {
                reason: AppCacheErrorReason::InvalidTtl(ttl.num_seconds()),
            })
        } else {
            Ok(())
        }
    }

    fn ensure_capacity(
        &self,
        entries: &mut HashMap<String, CacheEntry>,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppCacheError> {
        let limit = self.max_items as usize;
        if entries.contains_key(key) || entries.len() < limit {
            return Ok(());
        }
        entries.retain(|_k, v| v.alive(now));
        if entries.len() < limit {
            Ok(())
        } else {
            Err(AppCacheError {
                reason: AppCacheErrorReason::ExceedCapacity(self.max_items),
            })
        }
    }
} // end of impl InMemKeyValueCache

#[async_trait]
impl AbstractKeyValueCache for InMemKeyValueCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppCacheError> {
        let now = Utc::now();
        let mut guard = self.entries.lock().await;
        let found = match guard.get(key) {
            Some(e) if e.alive(now) => Some(e.value.clone()),
            Some(_expired) => {
                let _discarded = guard.remove(key);
                None
            }
            None => None,
        };
        Ok(found)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), AppCacheError> {
        Self::check_ttl(ttl)?;
        let now = Utc::now();
        let mut guard = self.entries.lock().await;
        self.ensure_capacity(&mut guard, key, now)?;
        let entry = CacheEntry {
            value,
            expiry: now + ttl,
        };
        let _old = guard.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<bool, AppCacheError> {
        Self::check_ttl(ttl)?;
        let now = Utc::now();
        let mut guard = self.entries.lock().await;
        if guard.get(key).map(|e| e.alive(now)).unwrap_or(false) {
            return Ok(false);
        }
        self.ensure_capacity(&mut guard, key, now)?;
        let entry = CacheEntry {
            value,
            expiry: now + ttl,
        };
        let _old = guard.insert(key.to_string(), entry);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, AppCacheError> {
        let now = Utc::now();
        let mut guard = self.entries.lock().await;
        let removed = guard.remove(key).map(|e| e.alive(now)).unwrap_or(false);
        Ok(removed)
    }

    async fn take(&self, key: &str) -> Result<Option<Vec<u8>>, AppCacheError> {
        let now = Utc::now();
        let mut guard = self.entries.lock().await;
        let found = guard
            .remove(key)
            .filter(|e| e.alive(now))
            .map(|e| e.value);
        Ok(found)
    }
} // end of impl AbstractKeyValueCache for InMemKeyValueCache
