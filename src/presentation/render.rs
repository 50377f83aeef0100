// Plain-text rendering of fetched records for the terminal
use crate::domain::model::{HotPool, MarketStats, TokenSummary, Tweet};
use crate::presentation::theme::Theme;
use std::fmt::Write;

fn cutoff(theme: &Theme) -> String {
    (theme.line)(&"⸺".repeat(40))
}

/// Compact USD amount: 1.2K, 3.4M, 5.6B, 7.8T
pub fn format_usd(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };

    if suffix.is_empty() && abs > 0.0 && abs < 0.01 {
        format!("${:.8}", value)
    } else {
        format!("${:.2}{}", scaled, suffix)
    }
}

pub fn format_tweets(tweets: &[Tweet], theme: &Theme) -> String {
    let mut output = String::new();

    if tweets.is_empty() {
        writeln!(output, "  {}", (theme.meta)("No tweets yet")).ok();
        return output;
    }

    for (i, tweet) in tweets.iter().enumerate() {
        let name = tweet
            .author
            .display_name
            .as_deref()
            .unwrap_or(&tweet.author.username);
        writeln!(
            output,
            "{}. {} {}",
            (theme.idx)(&(i + 1).to_string()),
            (theme.title)(name),
            (theme.handle)(&format!("@{}", tweet.author.username))
        )
        .ok();

        if !tweet.content.is_empty() {
            writeln!(output, "   {}", (theme.body)(&tweet.content)).ok();
        }
        if let Some(image) = &tweet.image_url {
            writeln!(output, "   {} {}", (theme.label)("[image]"), image).ok();
        }
        writeln!(
            output,
            "   {}",
            (theme.meta)(&format!(
                "♥ {}  ⟲ {}  ✉ {}  · {}",
                tweet.likes_count, tweet.retweets_count, tweet.replies_count, tweet.created_at
            ))
        )
        .ok();
        writeln!(output).ok();
    }

    output
}

pub fn format_pools(pools: &[HotPool], theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Hot pools")).ok();
    writeln!(output, "  {}", cutoff(theme)).ok();

    for (i, pool) in pools.iter().enumerate() {
        let change = pool
            .price_change_24h
            .map(|c| theme.change(c))
            .unwrap_or_default();
        writeln!(
            output,
            "  {}. {}  {} {}",
            (theme.idx)(&(i + 1).to_string()),
            (theme.label)(&pool.name),
            format_usd(pool.price_usd),
            change
        )
        .ok();
        writeln!(
            output,
            "     {}",
            (theme.meta)(&format!(
                "vol 24h {} · liquidity {} · {}",
                format_usd(pool.volume_24h_usd),
                format_usd(pool.liquidity_usd),
                pool.address
            ))
        )
        .ok();
    }

    output
}

pub fn format_tokens(tokens: &[TokenSummary], theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Top tokens")).ok();
    writeln!(output, "  {}", cutoff(theme)).ok();

    for (i, token) in tokens.iter().enumerate() {
        output.push_str(&format_token_line(i + 1, token, theme));
    }

    output
}

pub fn format_token(token: &TokenSummary, theme: &Theme) -> String {
    let mut output = format_token_line(1, token, theme);
    if let Some(volume) = token.volume_24h_usd {
        writeln!(output, "     {}", (theme.meta)(&format!("vol 24h {}", format_usd(volume)))).ok();
    }
    writeln!(output, "     {}", (theme.meta)(&token.address)).ok();
    output
}

fn format_token_line(idx: usize, token: &TokenSummary, theme: &Theme) -> String {
    let change = token
        .price_change_24h
        .map(|c| theme.change(c))
        .unwrap_or_default();
    let cap = token
        .market_cap_usd
        .map(|c| format!(" · mcap {}", format_usd(c)))
        .unwrap_or_default();

    format!(
        "  {}. {} {}  {} {}{}\n",
        (theme.idx)(&idx.to_string()),
        (theme.label)(&token.symbol),
        (theme.handle)(&token.name),
        format_usd(token.price_usd),
        change,
        (theme.meta)(&cap)
    )
}

pub fn format_stats(stats: &MarketStats, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}", (theme.title)("Market")).ok();
    writeln!(output, "  {}", cutoff(theme)).ok();
    writeln!(
        output,
        "  {} {}",
        (theme.label)("Market cap "),
        format_usd(stats.total_market_cap_usd)
    )
    .ok();
    writeln!(
        output,
        "  {} {}",
        (theme.label)("Volume 24h "),
        format_usd(stats.total_volume_24h_usd)
    )
    .ok();
    if let Some(dominance) = stats.btc_dominance {
        writeln!(output, "  {} {:.1}%", (theme.label)("BTC dom.   "), dominance).ok();
    }
    if let Some(active) = stats.active_tokens {
        writeln!(output, "  {} {}", (theme.label)("Tokens     "), active).ok();
    }
    if let Some(updated) = &stats.updated_at {
        writeln!(output, "  {}", (theme.meta)(&format!("updated {}", updated))).ok();
    }
    output
}
