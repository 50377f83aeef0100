//! Market data proxy endpoints
//!
//! Each endpoint validates the request, calls the upstream market API and
//! reshapes its answer. Upstream failures and unexpected shapes are replaced
//! with bundled fallback data, so a valid request always gets a 200.

use crate::api::{fallback, shape};
use crate::domain::error::LoungeError;
use crate::domain::model::DataSource;
use crate::domain::traits::MarketDataProvider;
use crate::infrastructure::config::MarketConfig;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;
const MAX_ADDRESS_LEN: usize = 128;

#[derive(Clone)]
pub struct ProxyState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub market: Arc<MarketConfig>,
    pub cache_max_age_secs: u64,
}

impl ProxyState {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        market: MarketConfig,
        cache_max_age_secs: u64,
    ) -> Self {
        Self {
            provider,
            market: Arc::new(market),
            cache_max_age_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    pub chain: String,
    pub address: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ProxyRequest {
    fn limit(&self) -> usize {
        self.params
            .get("limit")
            .and_then(|l| l.parse::<usize>().ok())
            .map(|l| l.clamp(1, MAX_LIST_LIMIT))
            .unwrap_or(DEFAULT_LIST_LIMIT)
    }

    /// Passed through to upstream, minus the keys the proxy consumes itself
    fn upstream_query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| k.as_str() != "limit")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.sort();
        query
    }
}

pub fn router(state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/functions/v1/hot-pools", post(hot_pools))
        .route("/functions/v1/market-stats", post(market_stats))
        .route("/functions/v1/token-details", post(token_details))
        .route("/functions/v1/top-tokens", post(top_tokens))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for LoungeError {
    fn into_response(self) -> Response {
        match self {
            LoungeError::InvalidRequest(message) => {
                error_response(StatusCode::BAD_REQUEST, &message)
            }
            other => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
        }
    }
}

/// Token addresses become an upstream path segment: ASCII alphanumerics only
fn is_token_address(address: &str) -> bool {
    !address.is_empty()
        && address.len() <= MAX_ADDRESS_LEN
        && address.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn parse_request(state: &ProxyState, body: &[u8]) -> Result<ProxyRequest, LoungeError> {
    let request: ProxyRequest = serde_json::from_slice(body)
        .map_err(|e| LoungeError::InvalidRequest(format!("invalid request body: {}", e)))?;

    if !state.market.supports_chain(&request.chain) {
        return Err(LoungeError::InvalidRequest(format!(
            "unsupported chain: {}",
            request.chain
        )));
    }
    Ok(request)
}

/// Outcome of one upstream call: shaped live data, or the reason to fall back
async fn fetch_shaped<T>(
    state: &ProxyState,
    path: &str,
    query: &[(String, String)],
    reshape: impl FnOnce(&str) -> Result<T, shape::ShapeError>,
) -> Result<T, String> {
    let response = state
        .provider
        .fetch(path, query)
        .await
        .map_err(|e| format!("upstream request failed: {}", e))?;

    if !response.is_success() {
        return Err(format!("upstream returned HTTP {}", response.status));
    }

    reshape(&response.body).map_err(|e| format!("unexpected upstream shape: {}", e))
}

/// Build the 200 body `{ <field>: data, source, error? }` with the cache directive
fn market_response<T: Serialize>(
    state: &ProxyState,
    endpoint: &str,
    field: &str,
    outcome: Result<T, String>,
    fallback: impl FnOnce() -> T,
) -> Response {
    let (data, source, error) = match outcome {
        Ok(data) => (data, DataSource::Live, None),
        Err(reason) => {
            warn!(endpoint, %reason, "serving fallback market data");
            (fallback(), DataSource::Fallback, Some(reason))
        }
    };

    let mut body = Map::new();
    body.insert(
        field.to_string(),
        serde_json::to_value(data).unwrap_or(Value::Null),
    );
    body.insert("source".to_string(), json!(source));
    if let Some(error) = error {
        body.insert("error".to_string(), Value::String(error));
    }

    let cache_control = format!("public, max-age={}", state.cache_max_age_secs);
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, cache_control)],
        Json(Value::Object(body)),
    )
        .into_response()
}

async fn hot_pools(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request = match parse_request(&state, &body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    debug!(chain = %request.chain, "hot-pools request");

    let limit = request.limit();
    let path = format!("/networks/{}/trending_pools", request.chain);
    let outcome = fetch_shaped(&state, &path, &request.upstream_query(), |body| {
        shape::hot_pools(body, limit)
    })
    .await;

    market_response(&state, "hot-pools", "hotPools", outcome, || {
        fallback::FALLBACK_HOT_POOLS.clone()
    })
}

async fn market_stats(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request = match parse_request(&state, &body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    debug!(chain = %request.chain, "market-stats request");

    let path = format!("/networks/{}/pools", request.chain);
    let outcome = fetch_shaped(&state, &path, &request.upstream_query(), shape::market_stats).await;

    market_response(&state, "market-stats", "stats", outcome, || {
        fallback::FALLBACK_MARKET_STATS.clone()
    })
}

async fn token_details(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request = match parse_request(&state, &body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let Some(address) = request.address.clone().filter(|a| !a.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "address is required");
    };
    if !is_token_address(&address) {
        return error_response(StatusCode::BAD_REQUEST, "address is malformed");
    }
    debug!(chain = %request.chain, %address, "token-details request");

    let path = format!("/networks/{}/tokens/{}", request.chain, address);
    let outcome =
        fetch_shaped(&state, &path, &request.upstream_query(), shape::token_details).await;

    market_response(&state, "token-details", "token", outcome, || {
        fallback::fallback_token(&address)
    })
}

async fn top_tokens(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request = match parse_request(&state, &body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    debug!(chain = %request.chain, "top-tokens request");

    let limit = request.limit();
    let path = format!("/networks/{}/tokens", request.chain);
    let outcome = fetch_shaped(&state, &path, &request.upstream_query(), |body| {
        shape::top_tokens(body, limit)
    })
    .await;

    market_response(&state, "top-tokens", "tokens", outcome, || {
        fallback::FALLBACK_TOP_TOKENS.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(params: &[(&str, &str)]) -> ProxyRequest {
        ProxyRequest {
            chain: "solana".to_string(),
            address: None,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(request(&[]).limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(request(&[("limit", "5")]).limit(), 5);
        assert_eq!(request(&[("limit", "0")]).limit(), 1);
        assert_eq!(request(&[("limit", "5000")]).limit(), MAX_LIST_LIMIT);
        assert_eq!(request(&[("limit", "many")]).limit(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn test_token_address_validation() {
        assert!(is_token_address("So11111111111111111111111111111111111111112"));
        assert!(is_token_address("0x6982508145454Ce325dDbE47a25d4ec3d2311933"));
        assert!(!is_token_address("../../solana/pools"));
        assert!(!is_token_address("abc?page=2"));
        assert!(!is_token_address("abc#frag"));
        assert!(!is_token_address("mint addr"));
        assert!(!is_token_address(&"a".repeat(MAX_ADDRESS_LEN + 1)));
    }

    #[test]
    fn test_upstream_query_drops_limit_and_sorts() {
        let query = request(&[("page", "2"), ("limit", "5"), ("include", "base_token")])
            .upstream_query();
        assert_eq!(
            query,
            vec![
                ("include".to_string(), "base_token".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }
}
