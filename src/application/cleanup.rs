use crate::application::cache::CacheLayer;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_millis(1_800_000);

/// Periodic sweep of expired cache entries
///
/// Owned by whoever starts it; there is no process-wide instance.
pub struct CleanupService {
    cache: CacheLayer,
    running: Option<Running>,
}

struct Running {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl CleanupService {
    pub fn new(cache: CacheLayer) -> Self {
        Self {
            cache,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    /// Start sweeping every `interval`. Returns false if already running.
    ///
    /// The first sweep happens one full interval after start.
    pub fn start(&mut self, interval: Duration) -> bool {
        if interval.is_zero() {
            warn!("cache cleanup interval must be non-zero");
            return false;
        }
        if self.is_running() {
            warn!("cache cleanup service already running");
            return false;
        }

        let cache = self.cache.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("cache cleanup service stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        match cache.cleanup_expired_cache().await {
                            Ok(0) => debug!("cache cleanup: nothing expired"),
                            Ok(removed) => info!(removed, "cache cleanup removed expired entries"),
                            // already logged by the cache layer
                            Err(_) => {}
                        }
                    }
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "cache cleanup service started");
        self.running = Some(Running {
            shutdown: shutdown_tx,
            handle,
        });
        true
    }

    /// Stop the sweep task and wait for it. Returns false if it was not running.
    pub async fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        let _ = running.shutdown.send(());
        if let Err(e) = running.handle.await {
            warn!(error = %e, "cache cleanup task ended abnormally");
        }
        info!("cache cleanup service stopped");
        true
    }
}

impl Drop for CleanupService {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}
