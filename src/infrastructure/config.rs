use crate::domain::error::LoungeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackendKind,
    /// SQLite file, defaults to the config directory
    pub path: Option<String>,
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
    #[serde(default = "default_true")]
    pub coalesce_requests: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarketConfig {
    #[serde(default = "default_market_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_supported_chains")]
    pub supported_chains: Vec<String>,
    #[serde(default = "default_chain")]
    pub default_chain: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            path: None,
            cleanup_interval_ms: default_cleanup_interval_ms(),
            coalesce_requests: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_max_age_secs: default_cache_max_age_secs(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_base_url(),
            api_key: None,
            supported_chains: default_supported_chains(),
            default_chain: default_chain(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            logging: Logging::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            market: MarketConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

// Defaults
fn default_theme() -> String {
    "temp".to_string()
}
fn default_enable() -> bool {
    true
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}
fn default_cache_backend() -> CacheBackendKind {
    CacheBackendKind::Sqlite
}
fn default_cleanup_interval_ms() -> u64 {
    1_800_000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8787
}
fn default_cache_max_age_secs() -> u64 {
    1800
}
fn default_market_base_url() -> String {
    "https://api.geckoterminal.com/api/v2".to_string()
}
fn default_supported_chains() -> Vec<String> {
    ["solana", "eth", "bsc", "base"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_chain() -> String {
    "solana".to_string()
}

impl MarketConfig {
    pub fn supports_chain(&self, chain: &str) -> bool {
        self.supported_chains.iter().any(|c| c == chain)
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tweetlounge").join("config.toml"))
}

/// Get cache database path (config value, else ~/.config/tweetlounge/cache.db)
pub fn get_database_path(config: &Config) -> PathBuf {
    if let Some(path) = config.cache.path.as_deref().filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tweetlounge")
        .join("cache.db")
}

pub fn parse_config(content: &str) -> Result<Config, LoungeError> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn load_config() -> Result<Config, LoungeError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            match parse_config(&content) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config file: {}. Using defaults.",
                        e
                    );
                }
            }
        }
    }

    Ok(Config::default())
}

pub fn generate_config_sample() -> Result<(), LoungeError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            eprintln!("Config file already exists at: {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let sample = Config::default();
        let toml_content = toml::to_string_pretty(&sample)
            .map_err(|e| LoungeError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, toml_content)
            .map_err(|e| LoungeError::Config(format!("Failed to write config file: {}", e)))?;
        println!("Generated config file at: {}", path.display());
    } else {
        return Err(LoungeError::Config(
            "Cannot determine config directory".to_string(),
        ));
    }

    Ok(())
}
