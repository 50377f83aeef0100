//! Config parsing tests

use tweetlounge::infrastructure::config::{parse_config, CacheBackendKind, Config};

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.theme, "temp");
    assert!(config.logging.enable);
    assert_eq!(config.logging.level, "WARN");
    assert_eq!(config.cache.backend, CacheBackendKind::Sqlite);
    assert_eq!(config.cache.cleanup_interval_ms, 1_800_000);
    assert!(config.cache.coalesce_requests);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8787);
    assert_eq!(config.server.cache_max_age_secs, 1800);
    assert_eq!(config.market.default_chain, "solana");
    assert!(config.backend.url.is_none());
}

#[test]
fn test_empty_file_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.server.port, 8787);
    assert_eq!(
        config.market.supported_chains,
        vec!["solana", "eth", "bsc", "base"]
    );
}

#[test]
fn test_config_toml_format() {
    let toml_content = r#"
theme = "neon"

[logging]
enable = true
path = "/tmp/tweetlounge.log"
level = "DEBUG"

[cache]
backend = "memory"
cleanup_interval_ms = 60000
coalesce_requests = false

[server]
port = 9000
cache_max_age_secs = 60

[market]
supported_chains = ["solana", "eth"]
api_key = "secret"

[backend]
url = "https://project.example.co"
anon_key = "anon"
"#;

    let config = parse_config(toml_content).unwrap();

    assert_eq!(config.theme, "neon");
    assert_eq!(config.logging.path.as_deref(), Some("/tmp/tweetlounge.log"));
    assert_eq!(config.logging.level, "DEBUG");
    assert_eq!(config.cache.backend, CacheBackendKind::Memory);
    assert_eq!(config.cache.cleanup_interval_ms, 60_000);
    assert!(!config.cache.coalesce_requests);
    // unspecified keys keep their defaults
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.cache_max_age_secs, 60);
    assert!(config.market.supports_chain("eth"));
    assert!(!config.market.supports_chain("bsc"));
    assert_eq!(config.market.api_key.as_deref(), Some("secret"));
    assert_eq!(config.backend.url.as_deref(), Some("https://project.example.co"));
}

#[test]
fn test_unknown_cache_backend_is_rejected() {
    let result = parse_config("[cache]\nbackend = \"redis\"\n");
    assert!(result.is_err());
}

#[test]
fn test_sample_round_trips() {
    let sample = toml::to_string_pretty(&Config::default()).unwrap();
    let parsed = parse_config(&sample).unwrap();
    assert_eq!(parsed.server.port, 8787);
    assert_eq!(parsed.cache.backend, CacheBackendKind::Sqlite);
}
