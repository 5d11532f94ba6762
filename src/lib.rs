pub mod config;
pub mod models;
pub mod catalog;
pub mod pipeline;
pub mod engine;
pub mod facility;
pub mod pii;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration tests.
///
/// Library consumers that install their own subscriber should skip this.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .try_init();
}
