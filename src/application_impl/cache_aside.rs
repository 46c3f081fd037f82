use crate::application_port::{CacheService, Cached};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::warn;

/// Read-through lookup: serve `key` from the cache when present, otherwise
/// run `load`, store its result for `ttl_secs` and return it. Errors from
/// `load` are returned as-is and never cached. Two concurrent misses may both
/// load; the last writer wins.
pub async fn read_through<T, E, F, Fut>(
    cache: &dyn CacheService,
    key: &str,
    ttl_secs: u64,
    load: F,
) -> Result<Cached<T>, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(doc) = cache.get(key).await {
        match serde_json::from_value::<T>(doc) {
            Ok(value) => return Ok(Cached::hit(value)),
            Err(e) => warn!(key, error = %e, "cached document has an unexpected shape, reloading"),
        }
    }

    let value = load().await?;
    match serde_json::to_value(&value) {
        Ok(doc) => {
            cache.set(key, &doc, ttl_secs).await;
        }
        Err(e) => warn!(key, error = %e, "loaded value is not cacheable"),
    }
    Ok(Cached::miss(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::RealCacheService;
    use crate::infra_memory::MemoryCacheStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn connected_cache() -> RealCacheService {
        let cache = RealCacheService::new(Arc::new(MemoryCacheStore::new()));
        assert!(cache.connect().await);
        cache
    }

    #[tokio::test]
    async fn second_read_is_a_hit_without_loading() {
        let cache = connected_cache().await;
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(vec![1, 2, 3])
        };

        let first = read_through(&cache, "k", 60, load).await.unwrap();
        let second = read_through(&cache, "k", 60, load).await.unwrap();

        assert!(!first.hit);
        assert!(second.hit);
        assert_eq!(first.value, second.value);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_errors_are_not_cached() {
        let cache = connected_cache().await;

        let err = read_through::<i32, _, _, _>(&cache, "k", 60, || async { Err("boom") }).await;
        assert_eq!(err.unwrap_err(), "boom");
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn disconnected_cache_always_loads() {
        let cache = RealCacheService::new(Arc::new(MemoryCacheStore::new()));
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(json!({"ok": true}))
        };

        for _ in 0..3 {
            let got = read_through(&cache, "k", 60, load).await.unwrap();
            assert!(!got.hit);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn wrongly_shaped_document_is_reloaded() {
        let cache = connected_cache().await;
        assert!(cache.set("k", &json!("not a number"), 60).await);

        let got = read_through(&cache, "k", 60, || async { Ok::<_, ()>(7u32) })
            .await
            .unwrap();

        assert_eq!(got, Cached::miss(7));
        assert_eq!(cache.get("k").await, Some(json!(7)));
    }

    #[tokio::test]
    async fn concurrent_misses_converge_on_one_value() {
        let cache = Arc::new(connected_cache().await);
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let cache = cache.clone();
            let loads = loads.clone();
            handles.push(tokio::spawn(async move {
                read_through(cache.as_ref(), "stats", 60, || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    Ok::<_, ()>(json!({"totalSquads": 4}))
                })
                .await
                .unwrap()
                .value
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), json!({"totalSquads": 4}));
        }

        let n = loads.load(Ordering::SeqCst);
        assert!((1..=2).contains(&n));
        assert_eq!(cache.get("stats").await, Some(json!({"totalSquads": 4})));
    }
}
