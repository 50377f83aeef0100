use crate::api::ProxyState;
use crate::application::cache::CacheLayer;
use crate::application::feed::Feed;
use crate::domain::error::LoungeError;
use crate::domain::traits::CacheStore;
use crate::infrastructure::config::{get_database_path, CacheBackendKind, Config};
use crate::infrastructure::network::client::{HttpMarketProvider, RestBackend};
use crate::infrastructure::network::http::create_client;
use crate::infrastructure::storage::cache::MemoryCacheStore;
use crate::infrastructure::storage::db::{init_database, SqliteCacheStore};
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub cache: CacheLayer,
    pub config: Arc<Config>,
    pub http_client: Client,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, LoungeError> {
        let store: Arc<dyn CacheStore> = match config.cache.backend {
            CacheBackendKind::Sqlite => {
                let db_path = get_database_path(&config);
                if let Some(parent) = db_path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                Arc::new(SqliteCacheStore::new(init_database(&db_path).await?))
            }
            CacheBackendKind::Memory => Arc::new(MemoryCacheStore::new()),
        };

        Self::with_store(store, config)
    }

    pub fn with_store(store: Arc<dyn CacheStore>, config: Config) -> Result<Self, LoungeError> {
        let cache = CacheLayer::new(store).with_coalescing(config.cache.coalesce_requests);

        Ok(Self {
            cache,
            config: Arc::new(config),
            http_client: create_client()?,
        })
    }

    /// Domain fetchers against the configured backend
    pub fn feed(&self) -> Result<Feed, LoungeError> {
        let backend = RestBackend::new(self.http_client.clone(), &self.config.backend)?;
        Ok(Feed::new(self.cache.clone(), Arc::new(backend)))
    }

    pub fn proxy_state(&self) -> ProxyState {
        let provider = HttpMarketProvider::new(self.http_client.clone(), &self.config.market);
        ProxyState::new(
            Arc::new(provider),
            self.config.market.clone(),
            self.config.server.cache_max_age_secs,
        )
    }
}
