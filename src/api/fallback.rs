// Bundled sample data served when the upstream market API is unavailable
use crate::domain::model::{HotPool, MarketStats, TokenSummary};
use once_cell::sync::Lazy;

pub static FALLBACK_HOT_POOLS: Lazy<Vec<HotPool>> = Lazy::new(|| {
    vec![
        HotPool {
            address: "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2".to_string(),
            name: "SOL / USDC".to_string(),
            base_token_symbol: "SOL".to_string(),
            quote_token_symbol: "USDC".to_string(),
            price_usd: 148.62,
            volume_24h_usd: 48_210_553.0,
            liquidity_usd: 12_904_220.0,
            price_change_24h: Some(2.41),
        },
        HotPool {
            address: "Czfq3xZZDmsdGdUyrNLtRhGc47cXcZtLG4crryfu44zE".to_string(),
            name: "JUP / SOL".to_string(),
            base_token_symbol: "JUP".to_string(),
            quote_token_symbol: "SOL".to_string(),
            price_usd: 0.94,
            volume_24h_usd: 9_384_010.0,
            liquidity_usd: 4_118_937.0,
            price_change_24h: Some(-1.87),
        },
        HotPool {
            address: "8sLbNZoA1cfnvMJLPfp98ZLAnFSYCFApfJKMbiXNLwxj".to_string(),
            name: "BONK / SOL".to_string(),
            base_token_symbol: "BONK".to_string(),
            quote_token_symbol: "SOL".to_string(),
            price_usd: 0.000_021_7,
            volume_24h_usd: 6_002_318.0,
            liquidity_usd: 2_775_604.0,
            price_change_24h: Some(5.12),
        },
    ]
});

pub static FALLBACK_MARKET_STATS: Lazy<MarketStats> = Lazy::new(|| MarketStats {
    total_market_cap_usd: 2_310_000_000_000.0,
    total_volume_24h_usd: 84_500_000_000.0,
    btc_dominance: Some(52.8),
    active_tokens: Some(10_412),
    updated_at: None,
});

pub static FALLBACK_TOP_TOKENS: Lazy<Vec<TokenSummary>> = Lazy::new(|| {
    [
        ("So11111111111111111111111111111111111111112", "SOL", "Wrapped SOL", 148.62, 68_900_000_000.0, 2.41),
        ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", "USD Coin", 1.0, 33_100_000_000.0, 0.01),
        ("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", "JUP", "Jupiter", 0.94, 1_270_000_000.0, -1.87),
        ("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "BONK", "Bonk", 0.000_021_7, 1_450_000_000.0, 5.12),
        ("EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm", "WIF", "dogwifhat", 1.73, 1_730_000_000.0, 3.36),
    ]
    .into_iter()
    .map(|(address, symbol, name, price, cap, change)| TokenSummary {
        address: address.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        price_usd: price,
        market_cap_usd: Some(cap),
        volume_24h_usd: None,
        price_change_24h: Some(change),
        image_url: None,
    })
    .collect()
});

/// Placeholder details for a token the upstream could not describe
pub fn fallback_token(address: &str) -> TokenSummary {
    FALLBACK_TOP_TOKENS
        .iter()
        .find(|t| t.address == address)
        .cloned()
        .unwrap_or_else(|| TokenSummary {
            address: address.to_string(),
            symbol: "UNKNOWN".to_string(),
            name: "Unknown token".to_string(),
            price_usd: 0.0,
            market_cap_usd: None,
            volume_24h_usd: None,
            price_change_24h: None,
            image_url: None,
        })
}
