use crate::domain::error::LoungeError;
use crate::domain::traits::{Backend, MarketDataProvider, UpstreamResponse};
use crate::infrastructure::config::{BackendConfig, MarketConfig};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

/// Backend-as-a-service REST client
///
/// Database functions live under `/rest/v1/rpc/<name>`, serverless functions
/// under `/functions/v1/<name>`.
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: Option<String>,
}

impl RestBackend {
    pub fn new(client: Client, config: &BackendConfig) -> Result<Self, LoungeError> {
        let base_url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| LoungeError::Config("backend.url not configured".to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.anon_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn post_json(&self, url: String, body: Value) -> Result<Value, LoungeError> {
        debug!(%url, "backend request");
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LoungeError::Api(format!(
                "{} returned {}: {}",
                url,
                status.as_u16(),
                text
            )));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn rpc(&self, function: &str, params: Value) -> Result<Value, LoungeError> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        self.post_json(url, params).await
    }

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, LoungeError> {
        let url = format!("{}/functions/v1/{}", self.base_url, function);
        self.post_json(url, body).await
    }
}

/// Third-party market data API (GeckoTerminal-style paths)
pub struct HttpMarketProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMarketProvider {
    pub fn new(client: Client, config: &MarketConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketProvider {
    async fn fetch(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, LoungeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "upstream market request");

        let mut request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}
