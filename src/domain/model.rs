use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

// 缓存条目 (one row of the cache table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Value,
    pub created_at: i64, // unix ms
    pub expires_at: i64, // unix ms, stale strictly after this instant
}

impl CacheEntry {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}

/// Named cache lifetimes shared by every fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationTier {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl DurationTier {
    pub const fn seconds(self) -> u64 {
        match self {
            DurationTier::Short => 300,
            DurationTier::Medium => 1800,
            DurationTier::Long => 86_400,
            DurationTier::VeryLong => 604_800,
        }
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.seconds())
    }
}

impl From<DurationTier> for Duration {
    fn from(tier: DurationTier) -> Self {
        tier.as_duration()
    }
}

// 数据来源: 实时 or 兜底数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => write!(f, "live"),
            DataSource::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub retweets_count: u64,
    #[serde(default)]
    pub replies_count: u64,
    pub author: Author,
}

/// Flat row returned by the feed RPCs, author columns inlined.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetRow {
    pub id: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub likes_count: Option<u64>,
    #[serde(default)]
    pub retweets_count: Option<u64>,
    #[serde(default)]
    pub replies_count: Option<u64>,
    pub author_id: Option<String>,
    pub author_username: Option<String>,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

impl TweetRow {
    /// Nest the author columns. Rows without an author or any content are dropped.
    pub fn into_tweet(self) -> Option<Tweet> {
        let author = Author {
            id: self.author_id.filter(|s| !s.is_empty())?,
            username: self.author_username.filter(|s| !s.is_empty())?,
            display_name: self.author_display_name,
            avatar_url: self.author_avatar_url,
        };
        if self.id.is_empty() || (self.content.is_none() && self.image_url.is_none()) {
            return None;
        }
        Some(Tweet {
            id: self.id,
            content: self.content.unwrap_or_default(),
            image_url: self.image_url,
            created_at: self.created_at,
            likes_count: self.likes_count.unwrap_or(0),
            retweets_count: self.retweets_count.unwrap_or(0),
            replies_count: self.replies_count.unwrap_or(0),
            author,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_market_cap_usd: f64,
    pub total_volume_24h_usd: f64,
    pub btc_dominance: Option<f64>,
    pub active_tokens: Option<u64>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotPool {
    pub address: String,
    pub name: String,
    pub base_token_symbol: String,
    pub quote_token_symbol: String,
    pub price_usd: f64,
    pub volume_24h_usd: f64,
    pub liquidity_usd: f64,
    pub price_change_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    pub market_cap_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub image_url: Option<String>,
}
