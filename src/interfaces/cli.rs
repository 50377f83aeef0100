use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tweetlounge")]
#[command(about = "Cached TweetLounge feed and market data, plus the market proxy server.")]
#[command(version)]
pub struct Cli {
    /// Run the market proxy server and the cache cleanup service
    #[arg(long)]
    pub serve: bool,

    /// Show the home feed
    #[arg(long)]
    pub feed: bool,

    /// Show tweets of one user
    #[arg(long, value_name = "USER_ID")]
    pub user: Option<String>,

    /// Show a single tweet
    #[arg(long, value_name = "TWEET_ID")]
    pub tweet: Option<String>,

    /// Show market stats
    #[arg(long)]
    pub stats: bool,

    /// Show hot pools
    #[arg(long)]
    pub pools: bool,

    /// Show top tokens
    #[arg(long)]
    pub tokens: bool,

    /// Show details of one token
    #[arg(long, value_name = "ADDRESS")]
    pub token: Option<String>,

    /// Chain for market queries (defaults to market.default_chain)
    #[arg(short = 'c', long)]
    pub chain: Option<String>,

    /// Page size for feeds
    #[arg(short = 'l', long, default_value_t = 10)]
    pub limit: u32,

    /// Page offset for feeds
    #[arg(short = 'o', long, default_value_t = 0)]
    pub offset: u32,

    /// Don't use cached result
    #[arg(short = 'n', long)]
    pub nocache: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Choose color theme
    #[arg(short = 'T', long)]
    pub theme: Option<String>,

    /// Remove expired cache entries and exit
    #[arg(long)]
    pub cleanup: bool,

    /// Drop one cache key
    #[arg(long, value_name = "KEY")]
    pub invalidate: Option<String>,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Show status
    #[arg(long)]
    pub status: bool,
}
