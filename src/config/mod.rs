//! # Controller Configuration
//!
//! Controller-level configuration loaded from environment variables.
//!
//! All configuration has sensible defaults and can be overridden via environment variables.
//! Environment variables are usually populated from a ConfigMap using `envFrom` in the deployment.

mod acm;
mod controller;
mod server;

pub use acm::AcmConfig;
pub use controller::{ControllerConfig, LogFormat};
pub use server::ServerConfig;

/// Load configuration from environment variables with defaults
#[must_use]
pub fn load_config() -> (ControllerConfig, ServerConfig, AcmConfig) {
    (
        ControllerConfig::from_env(),
        ServerConfig::from_env(),
        AcmConfig::from_env(),
    )
}

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as boolean or return default
pub(crate) fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |v| parse_bool(&v))
}

/// Read environment variable as string or return default
pub(crate) fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read environment variable, treating unset and blank values the same
pub(crate) fn env_var_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> bool {
    let v_lower = value.trim().to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_truthy_values() {
        for value in ["true", "TRUE", "1", "yes", " on "] {
            assert!(parse_bool(value), "{value} should parse as true");
        }
    }

    #[test]
    fn test_parse_bool_falsy_values() {
        for value in ["false", "0", "no", "off", ""] {
            assert!(!parse_bool(value), "{value} should parse as false");
        }
    }

    #[test]
    fn test_env_var_or_default_missing_key() {
        let value: u64 = env_var_or_default("CERT_SECRET_SYNCER_TEST_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }
}
