// Main entry point
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use tweetlounge::api::server;
use tweetlounge::application::feed::Feed;
use tweetlounge::infrastructure::config::{self, load_config, Logging};
use tweetlounge::interfaces::cli::Cli;
use tweetlounge::presentation::{render, theme::Theme};
use tweetlounge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config()?;

    // Initialize logging
    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        config::generate_config_sample()?;
        return Ok(());
    }

    let state = AppState::new(config).await?;

    if cli.serve {
        let shutdown = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => eprintln!("\nShutdown signal received, stopping..."),
                Err(e) => eprintln!("Failed to listen for shutdown signal: {}", e),
            }
        };
        server::serve(&state, shutdown).await?;
        return Ok(());
    }
    if cli.status {
        print_status(&state).await?;
        return Ok(());
    }
    if cli.cleanup {
        let removed = state.cache.cleanup_expired_cache().await?;
        println!("Removed {} expired cache entries", removed);
        return Ok(());
    }
    if let Some(key) = &cli.invalidate {
        let removed = state.cache.clear_cached_data(key).await?;
        if removed {
            println!("Invalidated {}", key);
        } else {
            println!("{}", format!("No cache entry for {}", key).yellow());
        }
        return Ok(());
    }

    let theme_name = cli.theme.as_deref().unwrap_or(state.config.theme.as_str());
    let theme = Theme::from_name(theme_name);
    let chain = cli
        .chain
        .clone()
        .unwrap_or_else(|| state.config.market.default_chain.clone());

    let feed = state.feed()?;
    let output = run_query(&cli, &feed, &chain, &theme).await?;
    match output {
        Some(text) => print!("{}", text),
        None => {
            eprintln!(
                "{}",
                "Nothing to do: try --feed, --stats, --pools or --help".red()
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

fn emit<T: Serialize>(
    value: &T,
    json: bool,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
    } else {
        Ok(text(value))
    }
}

/// Run the selected fetcher and render its result
async fn run_query(
    cli: &Cli,
    feed: &Feed,
    chain: &str,
    theme: &Theme,
) -> anyhow::Result<Option<String>> {
    let force = cli.nocache;

    let output = if cli.feed {
        let tweets = feed.home_feed(cli.limit, cli.offset, force).await?;
        emit(&tweets, cli.json, |t| render::format_tweets(t, theme))?
    } else if let Some(user_id) = &cli.user {
        let tweets = feed.user_tweets(user_id, cli.limit, cli.offset, force).await?;
        emit(&tweets, cli.json, |t| render::format_tweets(t, theme))?
    } else if let Some(tweet_id) = &cli.tweet {
        match feed.tweet(tweet_id, force).await? {
            Some(tweet) => emit(&tweet, cli.json, |t| {
                render::format_tweets(std::slice::from_ref(t), theme)
            })?,
            None => format!("{}\n", format!("Tweet {} not found", tweet_id).yellow()),
        }
    } else if cli.stats {
        let stats = feed.market_stats(chain, force).await?;
        emit(&stats, cli.json, |s| render::format_stats(s, theme))?
    } else if cli.pools {
        let pools = feed.hot_pools(chain, force).await?;
        emit(&pools, cli.json, |p| render::format_pools(p, theme))?
    } else if cli.tokens {
        let tokens = feed.top_tokens(chain, force).await?;
        emit(&tokens, cli.json, |t| render::format_tokens(t, theme))?
    } else if let Some(address) = &cli.token {
        let token = feed.token_details(chain, address, force).await?;
        emit(&token, cli.json, |t| render::format_token(t, theme))?
    } else {
        return Ok(None);
    };

    Ok(Some(output))
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn print_status(state: &AppState) -> anyhow::Result<()> {
    println!("{}", "tweetlounge Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let cfg = &state.config;
    match cfg.cache.backend {
        config::CacheBackendKind::Sqlite => {
            let db_path = config::get_database_path(cfg);
            let count = state.cache.entry_count().await?;
            println!("Cache: {} ({} entries)", db_path.display(), count);
        }
        config::CacheBackendKind::Memory => println!("Cache: in-memory"),
    }
    println!(
        "Cleanup interval: {} ms, coalescing {}",
        cfg.cache.cleanup_interval_ms,
        if cfg.cache.coalesce_requests { "on" } else { "off" }
    );

    println!(
        "Config: {}",
        config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found".to_string())
    );

    match cfg.backend.url.as_deref() {
        Some(url) if !url.is_empty() => println!("Backend: {}", url),
        _ => println!("Backend: Not configured"),
    }
    println!("Market API: {}", cfg.market.base_url);
    println!(
        "Proxy: http://{}:{} (max-age {}s)",
        cfg.server.host, cfg.server.port, cfg.server.cache_max_age_secs
    );

    Ok(())
}
