//! Reshape upstream market API bodies into the proxy's records.
//!
//! The upstream follows the JSON:API layout (`{ "data": [ { "attributes": {..} } ] }`)
//! and encodes most numbers as strings. Anything that does not match yields a
//! [`ShapeError`] so the caller can substitute fallback data.

use crate::domain::model::{HotPool, MarketStats, TokenSummary};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeError(pub String);

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_body(body: &str) -> Result<Value, ShapeError> {
    serde_json::from_str(body).map_err(|e| ShapeError(format!("invalid JSON: {}", e)))
}

fn data_array(root: &Value) -> Result<&Vec<Value>, ShapeError> {
    root.get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ShapeError("missing `data` array".to_string()))
}

/// Numbers arrive either as JSON numbers or numeric strings
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn pool_from(item: &Value) -> Option<HotPool> {
    let attrs = item.get("attributes")?;
    let name = text(attrs.get("name"))?;
    let mut symbols = name.split(" / ").map(str::trim);
    let base = symbols.next().unwrap_or_default().to_string();
    let quote = symbols.next().unwrap_or_default().to_string();

    Some(HotPool {
        address: text(attrs.get("address"))?,
        base_token_symbol: base,
        quote_token_symbol: quote,
        price_usd: number(attrs.get("base_token_price_usd"))?,
        volume_24h_usd: number(attrs.pointer("/volume_usd/h24")).unwrap_or(0.0),
        liquidity_usd: number(attrs.get("reserve_in_usd")).unwrap_or(0.0),
        price_change_24h: number(attrs.pointer("/price_change_percentage/h24")),
        name,
    })
}

fn token_from(item: &Value) -> Option<TokenSummary> {
    let attrs = item.get("attributes")?;
    Some(TokenSummary {
        address: text(attrs.get("address"))?,
        symbol: text(attrs.get("symbol"))?,
        name: text(attrs.get("name"))?,
        price_usd: number(attrs.get("price_usd"))?,
        market_cap_usd: number(attrs.get("market_cap_usd")).or(number(attrs.get("fdv_usd"))),
        volume_24h_usd: number(attrs.pointer("/volume_usd/h24")),
        price_change_24h: number(attrs.pointer("/price_change_percentage/h24")),
        image_url: text(attrs.get("image_url")),
    })
}

pub fn hot_pools(body: &str, limit: usize) -> Result<Vec<HotPool>, ShapeError> {
    let root = parse_body(body)?;
    let pools: Vec<HotPool> = data_array(&root)?
        .iter()
        .filter_map(pool_from)
        .take(limit)
        .collect();

    if pools.is_empty() {
        return Err(ShapeError("no usable pools in `data`".to_string()));
    }
    Ok(pools)
}

pub fn top_tokens(body: &str, limit: usize) -> Result<Vec<TokenSummary>, ShapeError> {
    let root = parse_body(body)?;
    let tokens: Vec<TokenSummary> = data_array(&root)?
        .iter()
        .filter_map(token_from)
        .take(limit)
        .collect();

    if tokens.is_empty() {
        return Err(ShapeError("no usable tokens in `data`".to_string()));
    }
    Ok(tokens)
}

pub fn token_details(body: &str) -> Result<TokenSummary, ShapeError> {
    let root = parse_body(body)?;
    let data = root
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| ShapeError("missing `data` object".to_string()))?;
    token_from(data).ok_or_else(|| ShapeError("token attributes incomplete".to_string()))
}

/// Aggregate chain-wide figures from the top pools listing
pub fn market_stats(body: &str) -> Result<MarketStats, ShapeError> {
    let root = parse_body(body)?;
    let pools = data_array(&root)?;
    if pools.is_empty() {
        return Err(ShapeError("empty `data` array".to_string()));
    }

    let mut market_cap = 0.0;
    let mut volume = 0.0;
    for attrs in pools.iter().filter_map(|p| p.get("attributes")) {
        market_cap += number(attrs.get("market_cap_usd"))
            .or(number(attrs.get("fdv_usd")))
            .unwrap_or(0.0);
        volume += number(attrs.pointer("/volume_usd/h24")).unwrap_or(0.0);
    }

    Ok(MarketStats {
        total_market_cap_usd: market_cap,
        total_volume_24h_usd: volume,
        btc_dominance: None,
        active_tokens: Some(pools.len() as u64),
        updated_at: Some(chrono::Utc::now().to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOLS_BODY: &str = r#"{
        "data": [
            {
                "id": "solana_abc",
                "type": "pool",
                "attributes": {
                    "address": "abc",
                    "name": "WIF / SOL",
                    "base_token_price_usd": "1.73",
                    "reserve_in_usd": "5000000.5",
                    "fdv_usd": "1730000000",
                    "volume_usd": { "h24": "1200000" },
                    "price_change_percentage": { "h24": "-3.2" }
                }
            },
            { "id": "broken", "attributes": { "name": "NO / ADDRESS" } }
        ]
    }"#;

    #[test]
    fn test_hot_pools_parses_string_numbers() {
        let pools = hot_pools(POOLS_BODY, 10).unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].base_token_symbol, "WIF");
        assert_eq!(pools[0].quote_token_symbol, "SOL");
        assert_eq!(pools[0].price_usd, 1.73);
        assert_eq!(pools[0].price_change_24h, Some(-3.2));
    }

    #[test]
    fn test_missing_data_array_is_shape_error() {
        assert!(hot_pools(r#"{"pools": []}"#, 10).is_err());
        assert!(hot_pools("not json", 10).is_err());
        assert!(hot_pools(r#"{"data": []}"#, 10).is_err());
    }

    #[test]
    fn test_market_stats_aggregates_pools() {
        let stats = market_stats(POOLS_BODY).unwrap();
        assert_eq!(stats.total_volume_24h_usd, 1_200_000.0);
        assert_eq!(stats.total_market_cap_usd, 1_730_000_000.0);
        assert_eq!(stats.active_tokens, Some(2));
    }

    #[test]
    fn test_token_details_requires_object() {
        let body = r#"{"data": {"attributes": {
            "address": "tok", "symbol": "TOK", "name": "Token", "price_usd": "0.5"
        }}}"#;
        let token = token_details(body).unwrap();
        assert_eq!(token.symbol, "TOK");
        assert_eq!(token.market_cap_usd, None);

        assert!(token_details(r#"{"data": []}"#).is_err());
    }
}
