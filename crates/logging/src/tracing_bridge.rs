//! crates/logging/src/tracing_bridge.rs
//! Subscriber installation driven by [`VerbosityConfig`].

use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use super::config::VerbosityConfig;

/// Builds the filter for a configuration.
///
/// `RUST_LOG`, when set and valid, takes precedence over the verbosity
/// mapping so ad-hoc debugging never needs a rebuild.
pub fn env_filter(config: &VerbosityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()))
}

/// Installs a global `fmt` subscriber writing to stderr.
///
/// Fails when a global subscriber is already installed.
///
/// # Example
///
/// ```rust,ignore
/// use logging::{VerbosityConfig, init_tracing};
///
/// init_tracing(&VerbosityConfig::from_verbose_level(2)).expect("subscriber");
/// tracing::info!(target: "rsync_progress::runner", "ready");
/// ```
pub fn init_tracing(config: &VerbosityConfig) -> Result<(), TryInitError> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(layer)
        .try_init()
}
