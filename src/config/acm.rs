//! # ACM Configuration
//!
//! AWS Certificate Manager client settings loaded from environment variables.

use super::env_var_non_empty;

/// AWS Certificate Manager client configuration
///
/// Credentials always come from the SDK default chain (IRSA, instance profile,
/// static keys in the environment).
#[derive(Debug, Clone, Default)]
pub struct AcmConfig {
    /// Region override. When unset the SDK resolves `AWS_REGION` / profile config.
    pub region: Option<String>,
    /// Endpoint override, e.g. a local ACM mock
    pub endpoint_url: Option<String>,
}

impl AcmConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            region: env_var_non_empty("AWS_REGION"),
            endpoint_url: env_var_non_empty("AWS_ACM_ENDPOINT"),
        }
    }
}
