use chrono::Duration;

use storefront_payment::adapter::cache::{
    AbstractKeyValueCache, AppCacheErrorReason, InMemKeyValueCache,
};

#[actix_web::test]
async fn set_get_delete_ok() {
    let cache = InMemKeyValueCache::new(10);
    let ttl = Duration::seconds(30);
    let result = cache.set("k1", b"v1".to_vec(), ttl).await;
    assert!(result.is_ok());
    let found = cache.get("k1").await.unwrap();
    assert_eq!(found.as_deref(), Some(b"v1".as_slice()));
    // overwrite
    cache.set("k1", b"v2".to_vec(), ttl).await.unwrap();
    let found = cache.get("k1").await.unwrap();
    assert_eq!(found.as_deref(), Some(b"v2".as_slice()));
    assert!(cache.delete("k1").await.unwrap());
    assert!(!cache.delete("k1").await.unwrap());
    assert!(cache.get("k1").await.unwrap().is_none());
}

#[actix_web::test]
async fn set_if_absent_once() {
    let cache = InMemKeyValueCache::new(10);
    let ttl = Duration::seconds(30);
    let stored = cache.set_if_absent("k2", b"first".to_vec(), ttl).await.unwrap();
    assert!(stored);
    let stored = cache.set_if_absent("k2", b"second".to_vec(), ttl).await.unwrap();
    assert!(!stored);
    let found = cache.get("k2").await.unwrap();
    assert_eq!(found.as_deref(), Some(b"first".as_slice()));
}

#[actix_web::test]
async fn take_consumes_entry() {
    let cache = InMemKeyValueCache::new(10);
    let ttl = Duration::seconds(30);
    cache.set("k3", b"payload".to_vec(), ttl).await.unwrap();
    let taken = cache.take("k3").await.unwrap();
    assert_eq!(taken.as_deref(), Some(b"payload".as_slice()));
    assert!(cache.take("k3").await.unwrap().is_none());
}

#[actix_web::test]
async fn entry_expired() {
    let cache = InMemKeyValueCache::new(10);
    let short = Duration::milliseconds(40);
    cache.set("k4", b"v".to_vec(), short).await.unwrap();
    cache.set_if_absent("k5", b"v".to_vec(), short).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(90)).await;
    assert!(cache.get("k4").await.unwrap().is_none());
    assert!(cache.take("k4").await.unwrap().is_none());
    // expired entry can be reserved again
    let stored = cache
        .set_if_absent("k5", b"again".to_vec(), Duration::seconds(5))
        .await
        .unwrap();
    assert!(stored);
}

#[actix_web::test]
async fn invalid_ttl() {
    let cache = InMemKeyValueCache::new(10);
    let result = cache.set("k6", b"v".to_vec(), Duration::zero()).await;
    let e = result.unwrap_err();
    assert_eq!(e.reason, AppCacheErrorReason::InvalidTtl(0));
    let result = cache
        .set_if_absent("k6", b"v".to_vec(), Duration::seconds(-3))
        .await;
    let e = result.unwrap_err();
    assert_eq!(e.reason, AppCacheErrorReason::InvalidTtl(-3));
}

#[actix_web::test]
async fn exceed_capacity() {
    let cache = InMemKeyValueCache::new(2);
    let ttl = Duration::seconds(30);
    cache.set("a", b"1".to_vec(), ttl).await.unwrap();
    cache
        .set("b", b"2".to_vec(), Duration::milliseconds(30))
        .await
        .unwrap();
    let e = cache.set("c", b"3".to_vec(), ttl).await.unwrap_err();
    assert_eq!(e.reason, AppCacheErrorReason::ExceedCapacity(2));
    // existing key can still be updated
    cache.set("a", b"11".to_vec(), ttl).await.unwrap();
    // room is made once expired entries are purged
    tokio::time::sleep(std::time::Duration::from_millis(70)).await;
    let stored = cache.set_if_absent("c", b"3".to_vec(), ttl).await.unwrap();
    assert!(stored);
}
