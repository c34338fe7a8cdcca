//! # AWS Certificate Manager Authentication
//!
//! Handles AWS SDK configuration and authentication setup.

use crate::config::AcmConfig;
use anyhow::{bail, Result};
use aws_config::SdkConfig;
use tracing::{info, warn};

/// Create AWS SDK config using the default credential chain.
///
/// IRSA works without extra wiring: the pod's service account carries the
/// `eks.amazonaws.com/role-arn` annotation and the SDK picks up the projected
/// web identity token.
pub async fn create_sdk_config(config: &AcmConfig) -> Result<SdkConfig> {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(region) = &config.region {
        builder = builder.region(aws_config::Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint_url {
        validate_endpoint(endpoint)?;
        info!("Routing AWS Certificate Manager requests to {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    let sdk_config = builder.load().await;

    match sdk_config.region() {
        Some(region) => info!("AWS Certificate Manager region: {}", region),
        None => warn!("No AWS region resolved; set AWS_REGION so ACM calls can be signed"),
    }

    Ok(sdk_config)
}

/// Reject endpoint overrides that are not URLs
fn validate_endpoint(endpoint: &str) -> Result<()> {
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        bail!("AWS_ACM_ENDPOINT '{endpoint}' must start with http:// or https://");
    }
    Ok(())
}
