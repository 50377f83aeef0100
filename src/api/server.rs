//! Proxy server lifecycle
//!
//! Binds the listener, starts the cache cleanup service and runs until the
//! shutdown future resolves.

use crate::api::proxy::router;
use crate::application::cleanup::{CleanupService, DEFAULT_CLEANUP_INTERVAL};
use crate::domain::error::LoungeError;
use crate::state::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

pub async fn serve<S>(state: &AppState, shutdown: S) -> Result<(), LoungeError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let server = &state.config.server;
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| LoungeError::Config(format!("Invalid bind address: {}", e)))?;

    let listener = TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => LoungeError::Config(format!(
            "Failed to bind to {}: address already in use (is another tweetlounge running?)",
            addr
        )),
        _ => LoungeError::Io(e),
    })?;

    let interval = match state.config.cache.cleanup_interval_ms {
        0 => DEFAULT_CLEANUP_INTERVAL,
        ms => Duration::from_millis(ms),
    };
    let mut cleanup = CleanupService::new(state.cache.clone());
    cleanup.start(interval);

    info!(%addr, "market proxy listening");
    let app = router(state.proxy_state());
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    cleanup.stop().await;
    info!("market proxy stopped");

    result.map_err(LoungeError::Io)
}
