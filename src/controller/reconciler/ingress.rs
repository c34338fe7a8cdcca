//! # Ingress Propagation
//!
//! Writes the certificate ARN onto every Ingress matched by the secret's
//! label selector annotation.

use crate::constants::CERTIFICATE_ARN_ANNOTATION;
use crate::controller::labels::parse_label_selector;
use crate::controller::reconciler::types::ReconcilerError;
use crate::controller::resources::ClusterResources;
use crate::observability::metrics;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Set the certificate ARN annotation on all ingresses matching `selector`.
///
/// Every matching ingress is written, even when it already carries the ARN.
/// The first failed write aborts the remaining updates.
/// Returns the number of ingresses updated.
pub async fn propagate_certificate_arn(
    resources: &dyn ClusterResources,
    selector: &str,
    certificate_arn: &str,
) -> Result<usize, ReconcilerError> {
    let labels =
        parse_label_selector(selector).map_err(|source| ReconcilerError::InvalidLabels {
            labels: selector.to_string(),
            source,
        })?;

    let ingresses = resources.list_ingresses(&labels).await.map_err(|source| {
        ReconcilerError::ListIngresses {
            labels: selector.to_string(),
            source,
        }
    })?;

    debug!(
        labels = %labels,
        count = ingresses.len(),
        "Found ingresses matching selector"
    );

    let mut updated = 0;
    for mut ingress in ingresses {
        let ingress_key = format!(
            "{}/{}",
            ingress.metadata.namespace.as_deref().unwrap_or("default"),
            ingress.metadata.name.as_deref().unwrap_or("unknown")
        );

        ingress
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(
                CERTIFICATE_ARN_ANNOTATION.to_string(),
                certificate_arn.to_string(),
            );

        resources
            .replace_ingress(&ingress)
            .await
            .map_err(|source| ReconcilerError::UpdateIngress {
                ingress: ingress_key.clone(),
                source,
            })?;

        metrics::increment_ingresses_updated(1);
        info!(
            ingress = ingress_key.as_str(),
            certificate.arn = certificate_arn,
            "Updated ingress certificate ARN"
        );
        updated += 1;
    }

    Ok(updated)
}
