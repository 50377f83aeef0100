use crate::application::cache::CacheLayer;
use crate::domain::error::LoungeError;
use crate::domain::model::{
    DurationTier, HotPool, MarketStats, TokenSummary, Tweet, TweetRow,
};
use crate::domain::traits::Backend;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub const HOME_FEED: &str = "home_feed";
pub const USER_TWEETS: &str = "user_tweets";
pub const TWEET: &str = "tweet";
pub const MARKET_STATS: &str = "market_stats";
pub const HOT_POOLS: &str = "hot_pools";
pub const TOP_TOKENS: &str = "top_tokens";
pub const TOKEN_DETAILS: &str = "token_details";

/// Build `namespace:{k1:v1,k2:v2}`, parameters kept in the given order
pub fn cache_key(namespace: &str, params: &[(&str, &dyn std::fmt::Display)]) -> String {
    let body = params
        .iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}:{{{}}}", namespace, body)
}

/// Domain fetchers: every read goes through the cache at the short tier
#[derive(Clone)]
pub struct Feed {
    cache: CacheLayer,
    backend: Arc<dyn Backend>,
}

impl Feed {
    pub fn new(cache: CacheLayer, backend: Arc<dyn Backend>) -> Self {
        Self { cache, backend }
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    pub async fn home_feed(
        &self,
        limit: u32,
        offset: u32,
        force_refresh: bool,
    ) -> Result<Vec<Tweet>, LoungeError> {
        let key = cache_key(HOME_FEED, &[("limit", &limit), ("offset", &offset)]);
        self.cache
            .fetch_with_cache(
                &key,
                || async {
                    let rows = self
                        .backend
                        .rpc(
                            "get_home_feed",
                            json!({ "p_limit": limit, "p_offset": offset }),
                        )
                        .await?;
                    Ok(tweets_from_rows(rows))
                },
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn user_tweets(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
        force_refresh: bool,
    ) -> Result<Vec<Tweet>, LoungeError> {
        let key = cache_key(
            USER_TWEETS,
            &[("userId", &user_id), ("limit", &limit), ("offset", &offset)],
        );
        self.cache
            .fetch_with_cache(
                &key,
                || async {
                    let rows = self
                        .backend
                        .rpc(
                            "get_user_tweets",
                            json!({ "p_user_id": user_id, "p_limit": limit, "p_offset": offset }),
                        )
                        .await?;
                    Ok(tweets_from_rows(rows))
                },
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn tweet(
        &self,
        tweet_id: &str,
        force_refresh: bool,
    ) -> Result<Option<Tweet>, LoungeError> {
        let key = cache_key(TWEET, &[("tweetId", &tweet_id)]);
        self.cache
            .fetch_with_cache(
                &key,
                || async {
                    let rows = self
                        .backend
                        .rpc("get_tweet_with_author", json!({ "p_tweet_id": tweet_id }))
                        .await?;
                    Ok(tweets_from_rows(rows).into_iter().next())
                },
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn market_stats(
        &self,
        chain: &str,
        force_refresh: bool,
    ) -> Result<MarketStats, LoungeError> {
        let key = cache_key(MARKET_STATS, &[("chain", &chain)]);
        self.cache
            .fetch_with_cache(
                &key,
                || self.invoke_proxy("market-stats", json!({ "chain": chain }), "stats"),
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn hot_pools(
        &self,
        chain: &str,
        force_refresh: bool,
    ) -> Result<Vec<HotPool>, LoungeError> {
        let key = cache_key(HOT_POOLS, &[("chain", &chain)]);
        self.cache
            .fetch_with_cache(
                &key,
                || async {
                    let pools: Vec<Value> = self
                        .invoke_proxy("hot-pools", json!({ "chain": chain }), "hotPools")
                        .await?;
                    Ok(keep_valid::<HotPool>(pools, HOT_POOLS))
                },
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn top_tokens(
        &self,
        chain: &str,
        force_refresh: bool,
    ) -> Result<Vec<TokenSummary>, LoungeError> {
        let key = cache_key(TOP_TOKENS, &[("chain", &chain)]);
        self.cache
            .fetch_with_cache(
                &key,
                || async {
                    let tokens: Vec<Value> = self
                        .invoke_proxy("top-tokens", json!({ "chain": chain }), "tokens")
                        .await?;
                    Ok(keep_valid::<TokenSummary>(tokens, TOP_TOKENS))
                },
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn token_details(
        &self,
        chain: &str,
        address: &str,
        force_refresh: bool,
    ) -> Result<TokenSummary, LoungeError> {
        let key = cache_key(TOKEN_DETAILS, &[("chain", &chain), ("address", &address)]);
        self.cache
            .fetch_with_cache(
                &key,
                || {
                    self.invoke_proxy(
                        "token-details",
                        json!({ "chain": chain, "address": address }),
                        "token",
                    )
                },
                DurationTier::Short,
                force_refresh,
            )
            .await
    }

    pub async fn invalidate_home_feed(&self, limit: u32, offset: u32) -> bool {
        let key = cache_key(HOME_FEED, &[("limit", &limit), ("offset", &offset)]);
        self.invalidate(&key).await
    }

    /// Drop one cached query. Store failures are logged and reported as `false`.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.clear_cached_data(key).await.unwrap_or(false)
    }

    /// Call a market proxy function and unwrap the payload under `field`
    async fn invoke_proxy<T: DeserializeOwned>(
        &self,
        function: &str,
        body: Value,
        field: &str,
    ) -> Result<T, LoungeError> {
        let mut envelope = self.backend.invoke(function, body).await?;
        if let Some(source) = envelope.get("source").and_then(Value::as_str) {
            debug!(function, source, "market proxy answered");
        }
        let payload = envelope
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| LoungeError::Api(format!("{} response missing `{}`", function, field)))?;
        Ok(serde_json::from_value(payload)?)
    }
}

/// Turn backend rows into tweets, dropping rows that are malformed or lack an author
pub fn tweets_from_rows(rows: Value) -> Vec<Tweet> {
    let rows = match rows {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        single => vec![single],
    };

    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<TweetRow>(row) {
            Ok(row) => {
                let id = row.id.clone();
                let tweet = row.into_tweet();
                if tweet.is_none() {
                    debug!(%id, "dropping tweet row without author or content");
                }
                tweet
            }
            Err(e) => {
                debug!(error = %e, "dropping malformed tweet row");
                None
            }
        })
        .collect()
}

fn keep_valid<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(what, error = %e, "dropping malformed record");
                None
            }
        })
        .collect()
}
