use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoungeError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API Error: {0}")]
    Api(String),

    /// Error reported by a cache producer to callers that joined an in-flight fetch.
    #[error("Producer error: {0}")]
    Producer(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure of a cache-layer write or sweep.
///
/// Cache reads never surface this type; they report failures through
/// [`crate::application::cache::CacheRead::Error`].
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache store failure: {0}")]
    Store(#[from] LoungeError),

    #[error("cache payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
