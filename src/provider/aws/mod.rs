//! # AWS Certificate Manager Client
//!
//! Client for importing certificates into AWS Certificate Manager.
//!
//! This module provides functionality to:
//! - Import a new certificate and obtain its ARN
//! - Re-import renewed material into an existing ARN
//! - Authenticate via the SDK default credential chain (IRSA, instance profile, env)

mod auth;
mod operations;

use aws_sdk_acm::Client as AcmClient;

use crate::config::AcmConfig;
use anyhow::Result;

use self::auth::create_sdk_config;

/// AWS Certificate Manager backend implementation
pub struct AwsCertificateManager {
    pub(crate) client: AcmClient,
    pub(crate) region: String,
}

impl std::fmt::Debug for AwsCertificateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCertificateManager")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsCertificateManager {
    /// Create a new ACM client from the process configuration
    #[allow(
        clippy::missing_errors_doc,
        reason = "SDK config loading only fails on invalid endpoint configuration"
    )]
    pub async fn new(config: &AcmConfig) -> Result<Self> {
        let sdk_config = create_sdk_config(config).await?;
        let region = sdk_config
            .region()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        let client = AcmClient::new(&sdk_config);

        Ok(Self { client, region })
    }
}
