// HTTP client utilities
use crate::domain::error::LoungeError;
use reqwest::Client;

/// Create the shared HTTP client
///
/// No request timeout is set here; timeouts are inherited from reqwest's defaults.
pub fn create_client() -> Result<Client, LoungeError> {
    Ok(Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("tweetlounge/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
