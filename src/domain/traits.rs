use crate::domain::error::LoungeError;
use crate::domain::model::CacheEntry;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for cache persistence
///
/// Key/value storage of JSON payloads with an expiry timestamp. Implementations
/// must overwrite on key conflict so at most one entry exists per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the entry for `key`, fresh or not
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, LoungeError>;

    /// Insert or overwrite the entry with the same key
    async fn upsert(&self, entry: CacheEntry) -> Result<(), LoungeError>;

    /// Delete the entry for `key`, returning whether one existed
    async fn delete(&self, key: &str) -> Result<bool, LoungeError>;

    /// Delete every entry with `expires_at < now_ms`
    async fn delete_expired(&self, now_ms: i64) -> Result<usize, LoungeError>;

    /// Number of stored entries, expired ones included
    async fn count(&self) -> Result<usize, LoungeError>;
}

/// Trait for the backend-as-a-service the feed reads from
///
/// `rpc` calls a database function, `invoke` calls a deployed serverless
/// function (the market proxies).
#[async_trait]
pub trait Backend: Send + Sync {
    async fn rpc(&self, function: &str, params: Value) -> Result<Value, LoungeError>;

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, LoungeError>;
}

/// Raw upstream reply, kept unparsed so the proxy decides between live and fallback data
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the third-party market data API behind the proxy endpoints
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, LoungeError>;
}
