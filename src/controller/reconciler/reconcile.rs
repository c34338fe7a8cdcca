//! # Reconcile
//!
//! One reconcile cycle for a single secret:
//!
//! 1. Fetch the secret (gone means nothing to do)
//! 2. Check the backend annotation (absent or unrecognized means not managed)
//! 3. Read `tls.crt` / `tls.key` and split the certificate chain
//! 4. Import into the backend, re-using a previously recorded ARN
//! 5. Record a newly allocated ARN on the secret
//! 6. Propagate the ARN to ingresses matched by the label selector annotation
//!
//! Every failure aborts the cycle and is returned to the controller runtime,
//! which requeues the secret. Re-running converges because each step is driven
//! only by the current state of the secret.

use crate::constants::{
    BACKEND_ANNOTATION, CERTIFICATE_ARN_ANNOTATION, INGRESS_LABELS_ANNOTATION, TLS_CERT_KEY,
    TLS_PRIVATE_KEY_KEY,
};
use crate::controller::certificate::{split_pem_certificates, CertificateBundle};
use crate::controller::reconciler::ingress::propagate_certificate_arn;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::controller::resources::SecretRef;
use crate::observability::metrics;
use crate::provider::{BackendKind, ImportCertificateRequest};
use k8s_openapi::api::core::v1::Secret;
use kube_runtime::controller::Action;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};
use zeroize::Zeroizing;

/// Reconcile a secret, bounded by the configured timeout.
///
/// A timeout drops the in-flight cycle and surfaces [`ReconcilerError::Timeout`].
pub async fn reconcile(
    secret_ref: SecretRef,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let span = info_span!(
        "controller.reconcile",
        resource.namespace = secret_ref.namespace.as_str(),
        resource.name = secret_ref.name.as_str(),
        resource.kind = "Secret"
    );

    async move {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let timeout = ctx.config.reconcile_timeout();
        let result = match tokio::time::timeout(timeout, reconcile_secret(&secret_ref, &ctx)).await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(ReconcilerError::Timeout(timeout)),
        };

        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
        result
    }
    .instrument(span)
    .await
}

/// The reconcile steps without timeout or metrics wrapping
///
/// # Errors
///
/// Returns the first failing step; see [`ReconcilerError`].
pub async fn reconcile_secret(
    secret_ref: &SecretRef,
    ctx: &Reconciler,
) -> Result<Action, ReconcilerError> {
    let fetched = ctx
        .resources
        .get_secret(secret_ref)
        .await
        .map_err(|source| ReconcilerError::FetchSecret {
            secret: secret_ref.to_string(),
            source,
        })?;

    let Some(mut secret) = fetched else {
        debug!("Secret no longer exists, nothing to reconcile");
        return Ok(Action::await_change());
    };

    let Some(backend) = annotation(&secret, BACKEND_ANNOTATION) else {
        return Ok(requeue(ctx, "unmanaged"));
    };

    match backend.parse::<BackendKind>() {
        Ok(BackendKind::Acm) => {
            info!("reconciling secret with AWS Certificate Manager backend");
        }
        Err(reason) => {
            // Left alone so secrets annotated for future backends do not error
            debug!(backend = backend, "Ignoring secret: {}", reason);
            return Ok(requeue(ctx, "unrecognized-backend"));
        }
    }

    let (bundle, private_key) = read_tls_material(&secret)?;
    debug!(
        certificates = bundle.len(),
        leaf.subject = bundle.leaf_subject(),
        leaf.not_after = ?bundle.leaf_not_after(),
        "Split certificate chain"
    );

    let existing_arn = annotation(&secret, CERTIFICATE_ARN_ANNOTATION)
        .filter(|arn| !arn.is_empty())
        .map(str::to_string);
    let operation = if existing_arn.is_some() {
        "update"
    } else {
        "create"
    };

    info!(operation = operation, "importing cert to {}", ctx.backend.name());
    let request = ImportCertificateRequest {
        certificate: bundle.leaf().to_vec(),
        certificate_chain: bundle.chain_pem(),
        private_key,
        certificate_arn: existing_arn.clone(),
    };
    let certificate_arn = ctx
        .backend
        .import_certificate(request)
        .await
        .map_err(ReconcilerError::Import)?;
    metrics::increment_certificates_imported(ctx.backend.name(), operation);

    if existing_arn.is_none() {
        secret
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(
                CERTIFICATE_ARN_ANNOTATION.to_string(),
                certificate_arn.clone(),
            );
        ctx.resources
            .replace_secret(&secret)
            .await
            .map_err(ReconcilerError::UpdateSecret)?;
        info!(
            certificate.arn = certificate_arn.as_str(),
            "Recorded certificate ARN on secret"
        );
    }

    if let Some(selector) = annotation(&secret, INGRESS_LABELS_ANNOTATION) {
        let updated =
            propagate_certificate_arn(ctx.resources.as_ref(), selector, &certificate_arn).await?;
        info!(
            ingresses = updated,
            certificate.arn = certificate_arn.as_str(),
            "Propagated certificate ARN to ingresses"
        );
    }

    Ok(requeue(ctx, "synced"))
}

/// Certificate bundle and private key from the secret's data
fn read_tls_material(
    secret: &Secret,
) -> Result<(CertificateBundle, Zeroizing<Vec<u8>>), ReconcilerError> {
    let data = secret.data.as_ref();

    let certificate = data
        .and_then(|d| d.get(TLS_CERT_KEY))
        .ok_or(ReconcilerError::MissingField {
            field: TLS_CERT_KEY,
        })?;
    let private_key = data
        .and_then(|d| d.get(TLS_PRIVATE_KEY_KEY))
        .ok_or(ReconcilerError::MissingField {
            field: TLS_PRIVATE_KEY_KEY,
        })?;

    let bundle = split_pem_certificates(&certificate.0)?;
    Ok((bundle, Zeroizing::new(private_key.0.clone())))
}

fn annotation<'a>(secret: &'a Secret, key: &str) -> Option<&'a str> {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .map(String::as_str)
}

fn requeue(ctx: &Reconciler, reason: &str) -> Action {
    metrics::increment_requeues_total(reason);
    Action::requeue(ctx.config.requeue_duration())
}
