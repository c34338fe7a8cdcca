//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use super::{env_var_non_empty, env_var_or_default, env_var_or_default_bool, env_var_or_default_str};
use std::str::FromStr;
use std::time::Duration;

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'text' or 'json'")),
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Requeue interval after a reconcile that did not fail (seconds).
    /// Secrets are re-checked at this interval even without a watch event.
    pub requeue_secs: u64,
    /// Reconciliation error requeue interval (seconds).
    /// Fixed; there is no progressive backoff.
    pub reconciliation_error_requeue_secs: u64,
    /// Upper bound for a single reconcile (seconds)
    pub reconcile_timeout_secs: u64,
    /// Maximum number of secrets reconciled at the same time
    pub max_concurrent_reconciliations: u16,
    /// Namespace to watch; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Default log directive when `RUST_LOG` is not set (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Enable ANSI colors in text logs
    pub log_enable_color: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            requeue_secs: DEFAULT_REQUEUE_SECS,
            reconciliation_error_requeue_secs: DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS,
            reconcile_timeout_secs: DEFAULT_RECONCILE_TIMEOUT_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            watch_namespace: None,
            log_level: "INFO".to_string(),
            log_format: LogFormat::Text,
            log_enable_color: true,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            requeue_secs: env_var_or_default("DEFAULT_REQUEUE_SECS", DEFAULT_REQUEUE_SECS),
            reconciliation_error_requeue_secs: env_var_or_default(
                "RECONCILIATION_ERROR_REQUEUE_SECS",
                DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS,
            ),
            reconcile_timeout_secs: env_var_or_default(
                "RECONCILE_TIMEOUT_SECS",
                DEFAULT_RECONCILE_TIMEOUT_SECS,
            ),
            max_concurrent_reconciliations: env_var_or_default(
                "MAX_CONCURRENT_RECONCILIATIONS",
                DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            ),
            watch_namespace: env_var_non_empty("WATCH_NAMESPACE"),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default("LOG_FORMAT", LogFormat::Text),
            log_enable_color: env_var_or_default_bool("LOG_ENABLE_COLOR", true),
        }
    }

    /// Get the requeue duration used after a reconcile completes
    #[must_use]
    pub fn requeue_duration(&self) -> Duration {
        Duration::from_secs(self.requeue_secs)
    }

    /// Get reconciliation error requeue duration
    #[must_use]
    pub fn reconciliation_error_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.reconciliation_error_requeue_secs)
    }

    /// Get the per-reconcile timeout
    #[must_use]
    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_secs)
    }
}
