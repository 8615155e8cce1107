//! Tracing initialization.
//!
//! Sets up tracing-subscriber with an env filter and fmt layer. `RUST_LOG`
//! wins; otherwise the configured log level applies.

use crate::error::{Error, Result};

/// Initialize the tracing subscriber. Call once, from the binary.
pub fn init_tracing(default_level: &str) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))
}
