// In-memory cache store using DashMap
use crate::domain::error::LoungeError;
use crate::domain::model::CacheEntry;
use crate::domain::traits::CacheStore;
use async_trait::async_trait;
use dashmap::DashMap;

/// Thread-safe in-memory cache store
#[derive(Default)]
pub struct MemoryCacheStore {
    map: DashMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, LoungeError> {
        Ok(self.map.get(key).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), LoungeError> {
        self.map.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, LoungeError> {
        Ok(self.map.remove(key).is_some())
    }

    async fn delete_expired(&self, now_ms: i64) -> Result<usize, LoungeError> {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.expires_at >= now_ms);
        Ok(before.saturating_sub(self.map.len()))
    }

    async fn count(&self) -> Result<usize, LoungeError> {
        Ok(self.map.len())
    }
}
