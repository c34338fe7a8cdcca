//! # Logging
//!
//! `tracing` subscriber setup.
//!
//! `RUST_LOG` takes precedence; otherwise `LOG_LEVEL` sets the level for this
//! crate and `kube` while everything else stays at `warn`.

use crate::config::{ControllerConfig, LogFormat};
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Build the env filter used by the subscriber
#[must_use]
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)))
}

fn default_directive(log_level: &str) -> String {
    let level = log_level.trim().to_lowercase();
    format!("warn,cert_secret_syncer={level},kube_runtime={level}")
}

/// Install the global tracing subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &ControllerConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(&config.log_level));

    let result = match config.log_format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Text => builder.with_ansi(config.log_enable_color).try_init(),
    };

    result.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
