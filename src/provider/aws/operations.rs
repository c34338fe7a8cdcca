//! # AWS Certificate Manager Operations
//!
//! Implements `CertificateBackend` for AWS Certificate Manager.

use crate::observability::metrics;
use crate::provider::{CertificateBackend, ImportCertificateRequest};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_acm::primitives::Blob;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use super::AwsCertificateManager;

const PROVIDER: &str = "aws-acm";

#[async_trait]
impl CertificateBackend for AwsCertificateManager {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn import_certificate(&self, request: ImportCertificateRequest) -> Result<String> {
        let operation = if request.certificate_arn.is_some() {
            "update"
        } else {
            "create"
        };
        let span = info_span!(
            "aws.acm.import_certificate",
            region = self.region.as_str(),
            operation.r#type = operation,
            certificate.arn = request.certificate_arn.as_deref().unwrap_or(""),
        );
        let start = Instant::now();

        async move {
            let ImportCertificateRequest {
                certificate,
                certificate_chain,
                private_key,
                certificate_arn,
            } = request;

            let result = self
                .client
                .import_certificate()
                .certificate(Blob::new(certificate))
                .private_key(Blob::new(private_key.to_vec()))
                .set_certificate_chain(certificate_chain.map(Blob::new))
                .set_certificate_arn(certificate_arn.clone())
                .send()
                .await;

            match result {
                Ok(output) => {
                    metrics::record_provider_operation(
                        PROVIDER,
                        operation,
                        start.elapsed().as_secs_f64(),
                    );
                    let Some(arn) = output.certificate_arn() else {
                        metrics::increment_provider_operation_errors(PROVIDER);
                        return Err(anyhow!(
                            "ImportCertificate succeeded but returned no certificate ARN"
                        ));
                    };
                    info!(
                        provider = PROVIDER,
                        region = self.region.as_str(),
                        operation = operation,
                        certificate.arn = arn,
                        "Imported certificate into ACM: {}",
                        arn
                    );
                    Ok(arn.to_string())
                }
                Err(e) => {
                    metrics::increment_provider_operation_errors(PROVIDER);
                    let error_details = format!("{e:?}");
                    warn!(
                        provider = PROVIDER,
                        region = self.region.as_str(),
                        operation = operation,
                        certificate.arn = certificate_arn.as_deref().unwrap_or(""),
                        error = %e,
                        error_details = %error_details,
                        "Failed to import certificate into ACM"
                    );
                    Err(import_failure(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Keep the SDK error as the source so `{:#}` renders the AWS cause
fn import_failure<E>(error: E) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    anyhow::Error::new(error).context("ImportCertificate request failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::reconciler::ReconcilerError;

    #[test]
    fn test_import_failure_keeps_cause_chain() {
        let cause = std::io::Error::other("AccessDeniedException: not authorized to import");
        let err = ReconcilerError::Import(import_failure(cause));
        let rendered = err.to_string();

        assert_eq!(rendered.matches("failed to import the certificate").count(), 1);
        assert!(rendered.contains("ImportCertificate request failed"));
        assert!(rendered.contains("AccessDeniedException"));
    }
}
