//! Cache access layer and the fetch-with-cache wrapper.
//!
//! Every cached read in the crate goes through [`CacheLayer`]. Freshness is
//! decided here: an entry whose `expires_at` has passed reads as a miss even
//! if the cleanup sweep has not removed it yet.

use crate::domain::error::{CacheError, LoungeError};
use crate::domain::model::CacheEntry;
use crate::domain::traits::CacheStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Outcome of a cache read
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead<T> {
    Hit(T),
    Miss,
    Error(String),
}

impl<T> CacheRead<T> {
    pub fn hit(self) -> Option<T> {
        match self {
            CacheRead::Hit(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, CacheRead::Miss)
    }
}

type FlightResult = Result<Value, String>;

#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    inflight: Arc<DashMap<String, broadcast::Sender<FlightResult>>>,
    coalesce: bool,
}

enum Role {
    Leader(broadcast::Sender<FlightResult>),
    Follower(broadcast::Receiver<FlightResult>),
    Solo,
}

/// Removes the leader's in-flight slot, also when the leader future is dropped mid-flight
struct FlightGuard<'a> {
    inflight: &'a DashMap<String, broadcast::Sender<FlightResult>>,
    key: &'a str,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.inflight.remove(self.key);
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            inflight: Arc::new(DashMap::new()),
            coalesce: true,
        }
    }

    /// Toggle single-flight coalescing of concurrent fetches for the same key
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Read the payload for `key`. Expired entries read as `Miss`.
    pub async fn get_cached_data(&self, key: &str) -> CacheRead<Value> {
        match self.store.get(key).await {
            Ok(Some(entry)) if entry.is_expired_at(now_ms()) => {
                debug!(key, expires_at = entry.expires_at, "cache entry expired");
                CacheRead::Miss
            }
            Ok(Some(entry)) => CacheRead::Hit(entry.payload),
            Ok(None) => CacheRead::Miss,
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                CacheRead::Error(e.to_string())
            }
        }
    }

    /// Typed read; a payload that does not decode into `T` is reported as `Error`
    pub async fn get_cached<T: DeserializeOwned>(&self, key: &str) -> CacheRead<T> {
        match self.get_cached_data(key).await {
            CacheRead::Hit(payload) => match serde_json::from_value(payload) {
                Ok(value) => CacheRead::Hit(value),
                Err(e) => {
                    warn!(key, error = %e, "cached payload has unexpected shape");
                    CacheRead::Error(e.to_string())
                }
            },
            CacheRead::Miss => CacheRead::Miss,
            CacheRead::Error(reason) => CacheRead::Error(reason),
        }
    }

    pub async fn set_cached_data<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        duration: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_value(data).map_err(|e| {
            warn!(key, error = %e, "cache payload could not be encoded");
            CacheError::Encode(e)
        })?;

        let now = now_ms();
        let ttl_ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
        };

        self.store.upsert(entry).await.map_err(|e| {
            warn!(key, error = %e, "cache write failed");
            CacheError::Store(e)
        })
    }

    /// Remove the entry for `key`; returns whether one existed
    pub async fn clear_cached_data(&self, key: &str) -> Result<bool, CacheError> {
        self.store.delete(key).await.map_err(|e| {
            warn!(key, error = %e, "cache delete failed");
            CacheError::Store(e)
        })
    }

    /// Delete every entry whose `expires_at` is before now
    pub async fn cleanup_expired_cache(&self) -> Result<usize, CacheError> {
        self.store.delete_expired(now_ms()).await.map_err(|e| {
            warn!(error = %e, "cache cleanup failed");
            CacheError::Store(e)
        })
    }

    pub async fn entry_count(&self) -> Result<usize, CacheError> {
        Ok(self.store.count().await?)
    }

    /// Serve `key` from cache, or run `producer`, store its value and return it.
    ///
    /// * `force_refresh` skips the cache read; the producer always runs.
    /// * Producer errors propagate and nothing is cached.
    /// * A failed cache write is logged; the produced value is still returned.
    /// * With coalescing on, concurrent calls for the same key share one
    ///   producer run. Forced refreshes never join another caller's run.
    pub async fn fetch_with_cache<T, F, Fut, D>(
        &self,
        key: &str,
        producer: F,
        duration: D,
        force_refresh: bool,
    ) -> Result<T, LoungeError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoungeError>>,
        D: Into<Duration>,
    {
        let duration = duration.into();

        if !force_refresh {
            match self.get_cached::<T>(key).await {
                CacheRead::Hit(value) => {
                    debug!(key, "cache hit");
                    return Ok(value);
                }
                CacheRead::Miss => debug!(key, "cache miss"),
                CacheRead::Error(reason) => debug!(key, %reason, "cache unreadable, fetching"),
            }
        }

        if !self.coalesce {
            return self.produce_and_store(key, producer, duration).await;
        }

        let role = match self.inflight.entry(key.to_string()) {
            Entry::Occupied(slot) if !force_refresh => Role::Follower(slot.get().subscribe()),
            Entry::Occupied(_) => Role::Solo,
            Entry::Vacant(slot) => {
                let (tx, _) = broadcast::channel(1);
                slot.insert(tx.clone());
                Role::Leader(tx)
            }
        };

        match role {
            Role::Solo => self.produce_and_store(key, producer, duration).await,
            Role::Follower(mut rx) => {
                debug!(key, "joining in-flight fetch");
                match rx.recv().await {
                    Ok(Ok(payload)) => Ok(serde_json::from_value(payload)?),
                    Ok(Err(message)) => Err(LoungeError::Producer(message)),
                    Err(_) => Err(LoungeError::Producer(format!(
                        "in-flight fetch for {} was abandoned",
                        key
                    ))),
                }
            }
            Role::Leader(tx) => {
                let guard = FlightGuard {
                    inflight: self.inflight.as_ref(),
                    key,
                };
                // an earlier leader may have stored the value after our first read
                let filled = if force_refresh {
                    None
                } else {
                    self.get_cached::<T>(key).await.hit()
                };
                let result = match filled {
                    Some(value) => {
                        debug!(key, "cache filled by an earlier fetch");
                        Ok(value)
                    }
                    None => self.produce_and_store(key, producer, duration).await,
                };
                drop(guard);

                let shared = match &result {
                    Ok(value) => serde_json::to_value(value).map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                // no receivers is fine
                let _ = tx.send(shared);
                result
            }
        }
    }

    async fn produce_and_store<T, F, Fut>(
        &self,
        key: &str,
        producer: F,
        duration: Duration,
    ) -> Result<T, LoungeError>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoungeError>>,
    {
        let value = producer().await?;
        // failure already logged by set_cached_data
        let _ = self.set_cached_data(key, &value, duration).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DurationTier;
    use crate::infrastructure::storage::cache::MemoryCacheStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, LoungeError> {
            Err(LoungeError::Api("store offline".to_string()))
        }
        async fn upsert(&self, _entry: CacheEntry) -> Result<(), LoungeError> {
            Err(LoungeError::Api("store offline".to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<bool, LoungeError> {
            Err(LoungeError::Api("store offline".to_string()))
        }
        async fn delete_expired(&self, _now_ms: i64) -> Result<usize, LoungeError> {
            Err(LoungeError::Api("store offline".to_string()))
        }
        async fn count(&self) -> Result<usize, LoungeError> {
            Err(LoungeError::Api("store offline".to_string()))
        }
    }

    /// Misses on its first read, then serves the inner store
    #[derive(Default)]
    struct LateFillStore {
        inner: MemoryCacheStore,
        first_read_done: AtomicBool,
    }

    #[async_trait]
    impl CacheStore for LateFillStore {
        async fn get(&self, key: &str) -> Result<Option<CacheEntry>, LoungeError> {
            if !self.first_read_done.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.get(key).await
        }
        async fn upsert(&self, entry: CacheEntry) -> Result<(), LoungeError> {
            self.inner.upsert(entry).await
        }
        async fn delete(&self, key: &str) -> Result<bool, LoungeError> {
            self.inner.delete(key).await
        }
        async fn delete_expired(&self, now_ms: i64) -> Result<usize, LoungeError> {
            self.inner.delete_expired(now_ms).await
        }
        async fn count(&self) -> Result<usize, LoungeError> {
            self.inner.count().await
        }
    }

    fn memory_layer() -> CacheLayer {
        CacheLayer::new(Arc::new(MemoryCacheStore::new()))
    }

    fn raw_entry(key: &str, expires_at: i64) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            payload: json!(key),
            created_at: 0,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let cache = memory_layer();
        let payload = json!({"pools": [1, 2, 3]});

        cache
            .set_cached_data("hot_pools:{chain:solana}", &payload, DurationTier::Short.into())
            .await
            .unwrap();

        assert_eq!(
            cache.get_cached_data("hot_pools:{chain:solana}").await,
            CacheRead::Hit(payload)
        );
    }

    #[tokio::test]
    async fn test_clear_then_read_is_miss() {
        let cache = memory_layer();
        cache
            .set_cached_data("k", &json!(1), DurationTier::Short.into())
            .await
            .unwrap();

        assert!(cache.clear_cached_data("k").await.unwrap());
        assert!(cache.get_cached_data("k").await.is_miss());
        // idempotent
        assert!(!cache.clear_cached_data("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = memory_layer();
        cache
            .store()
            .upsert(raw_entry("stale", now_ms() - 1_000))
            .await
            .unwrap();

        assert!(cache.get_cached_data("stale").await.is_miss());
        // still stored until a sweep runs
        assert_eq!(cache.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_removes_exactly_expired_entries() {
        let cache = memory_layer();
        let now = now_ms();
        cache.store().upsert(raw_entry("a", now - 10_000)).await.unwrap();
        cache.store().upsert(raw_entry("b", now - 1)).await.unwrap();
        cache.store().upsert(raw_entry("c", now + 60_000)).await.unwrap();

        let removed = cache.cleanup_expired_cache().await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(cache.get_cached_data("c").await, CacheRead::Hit(json!("c")));
        assert_eq!(cache.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_failures_are_reported_not_thrown() {
        let cache = CacheLayer::new(Arc::new(BrokenStore));

        assert!(matches!(
            cache.get_cached_data("k").await,
            CacheRead::Error(_)
        ));
        assert!(cache
            .set_cached_data("k", &json!(1), Duration::from_secs(1))
            .await
            .is_err());
        assert!(cache.clear_cached_data("k").await.is_err());
        assert!(cache.cleanup_expired_cache().await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_payload_shape_is_error() {
        let cache = memory_layer();
        cache
            .set_cached_data("k", &json!("not a number"), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(matches!(cache.get_cached::<u32>("k").await, CacheRead::Error(_)));
    }

    #[tokio::test]
    async fn test_fetch_hit_skips_producer() {
        let cache = memory_layer();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Vec<u32> = cache
                .fetch_with_cache(
                    "numbers",
                    || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(vec![1, 2, 3])
                    },
                    DurationTier::Short,
                    false,
                )
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_leader_rechecks_cache_before_producing() {
        let store = Arc::new(LateFillStore::default());
        let cache = CacheLayer::new(store.clone());
        cache
            .set_cached_data("numbers", &vec![7u32], DurationTier::Short.into())
            .await
            .unwrap();
        let calls = AtomicUsize::new(0);

        let value: Vec<u32> = cache
            .fetch_with_cache(
                "numbers",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                },
                DurationTier::Short,
                false,
            )
            .await
            .unwrap();

        assert_eq!(value, vec![7]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_force_refresh_always_produces_and_overwrites() {
        let cache = memory_layer();
        cache
            .set_cached_data("k", &json!("old"), Duration::from_secs(60))
            .await
            .unwrap();

        let value: String = cache
            .fetch_with_cache("k", || async { Ok("new".to_string()) }, DurationTier::Short, true)
            .await
            .unwrap();

        assert_eq!(value, "new");
        assert_eq!(cache.get_cached_data("k").await, CacheRead::Hit(json!("new")));
    }

    #[tokio::test]
    async fn test_producer_error_is_not_cached() {
        let cache = memory_layer();

        let result: Result<u32, _> = cache
            .fetch_with_cache(
                "k",
                || async { Err(LoungeError::Api("rpc down".to_string())) },
                DurationTier::Short,
                false,
            )
            .await;

        assert!(matches!(result, Err(LoungeError::Api(_))));
        assert!(cache.get_cached_data("k").await.is_miss());
    }

    #[tokio::test]
    async fn test_broken_store_still_returns_produced_value() {
        let cache = CacheLayer::new(Arc::new(BrokenStore));

        let value: u32 = cache
            .fetch_with_cache("k", || async { Ok(7) }, DurationTier::Short, false)
            .await
            .unwrap();

        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_producer() {
        let cache = memory_layer();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |cache: CacheLayer, calls: Arc<AtomicUsize>| async move {
            cache
                .fetch_with_cache(
                    "shared",
                    || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, LoungeError>("value".to_string())
                    },
                    DurationTier::Short,
                    false,
                )
                .await
        };

        let (a, b) = tokio::join!(
            fetch(cache.clone(), calls.clone()),
            fetch(cache.clone(), calls.clone())
        );

        assert_eq!(a.unwrap(), "value");
        assert_eq!(b.unwrap(), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.inflight.is_empty());
    }

    #[tokio::test]
    async fn test_followers_receive_leader_error() {
        let cache = memory_layer();

        let leader = cache.fetch_with_cache(
            "failing",
            || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<u32, _>(LoungeError::Api("upstream 500".to_string()))
            },
            DurationTier::Short,
            false,
        );
        let follower = cache.fetch_with_cache(
            "failing",
            || async { Ok::<u32, LoungeError>(1) },
            DurationTier::Short,
            false,
        );

        let (a, b) = tokio::join!(leader, follower);

        assert!(matches!(a, Err(LoungeError::Api(_))));
        assert!(matches!(b, Err(LoungeError::Producer(ref m)) if m.contains("upstream 500")));
    }

    #[tokio::test]
    async fn test_without_coalescing_last_write_wins() {
        let cache = memory_layer().with_coalescing(false);
        let calls = AtomicUsize::new(0);

        let slow = cache.fetch_with_cache(
            "race",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(60)).await;
                Ok::<_, LoungeError>("slow".to_string())
            },
            DurationTier::Short,
            false,
        );
        let fast = cache.fetch_with_cache(
            "race",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, LoungeError>("fast".to_string())
            },
            DurationTier::Short,
            false,
        );

        let (a, b) = tokio::join!(slow, fast);

        assert_eq!(a.unwrap(), "slow");
        assert_eq!(b.unwrap(), "fast");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.get_cached_data("race").await,
            CacheRead::Hit(json!("slow"))
        );
    }
}
