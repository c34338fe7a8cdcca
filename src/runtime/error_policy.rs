//! # Error Policy
//!
//! Error handling for the controller watch loop: failed reconciles and
//! controller stream errors.

use crate::controller::reconciler::{Reconciler, ReconcilerError};
use crate::observability;
use k8s_openapi::api::core::v1::Secret;
use kube_runtime::controller::{self, Action};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::watcher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One item of the `Controller::run` output stream
pub type ControllerEvent =
    Result<(ObjectRef<Secret>, Action), controller::Error<ReconcilerError, watcher::Error>>;

/// Handle reconciliation errors with a fixed requeue interval
///
/// Every failure is retried after `RECONCILIATION_ERROR_REQUEUE_SECS`. There is
/// no progressive backoff and no per-secret error state.
pub fn handle_reconciliation_error(
    obj: Arc<Secret>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.metadata.name.as_deref().unwrap_or("unknown");
    let namespace = obj.metadata.namespace.as_deref().unwrap_or("default");

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name,
        resource.namespace = namespace,
        error.kind = error.kind(),
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);
    observability::metrics::increment_reconciliation_errors();

    let delay = ctx.config.reconciliation_error_requeue_duration();
    let next_trigger_time = chrono::Utc::now()
        + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    info!(
        "Next retry scheduled: {} (in {}s, trigger source: error)",
        next_trigger_time.to_rfc3339(),
        delay.as_secs()
    );

    observability::metrics::increment_requeues_total("error");
    Action::requeue(delay)
}

/// Log one item of the controller output stream
///
/// Reconcile failures are already reported by [`handle_reconciliation_error`],
/// so only the remaining controller errors are logged here.
pub fn log_controller_event(event: &ControllerEvent) {
    match event {
        Ok((object, action)) => {
            debug!(
                resource.name = object.name.as_str(),
                resource.namespace = object.namespace.as_deref().unwrap_or("default"),
                action = ?action,
                "watch.event.reconciled"
            );
        }
        Err(controller::Error::ReconcilerFailed(_, object)) => {
            debug!(
                resource.name = object.name.as_str(),
                resource.namespace = object.namespace.as_deref().unwrap_or("default"),
                "watch.event.reconcile_failed"
            );
        }
        Err(controller::Error::ObjectNotFound(object)) => {
            warn!(
                resource.name = object.name.as_str(),
                "Secret not found in the cache (likely deleted), continuing watch..."
            );
        }
        Err(e) => {
            warn!(error = %e, "Controller stream error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::controller::labels::LabelSet;
    use crate::controller::resources::{ClusterResources, SecretRef};
    use crate::provider::{CertificateBackend, ImportCertificateRequest};
    use async_trait::async_trait;
    use k8s_openapi::api::networking::v1::Ingress;
    use std::time::Duration;

    struct Unreachable;

    #[async_trait]
    impl ClusterResources for Unreachable {
        async fn get_secret(&self, _: &SecretRef) -> anyhow::Result<Option<Secret>> {
            unreachable!()
        }
        async fn replace_secret(&self, _: &Secret) -> anyhow::Result<Secret> {
            unreachable!()
        }
        async fn list_ingresses(&self, _: &LabelSet) -> anyhow::Result<Vec<Ingress>> {
            unreachable!()
        }
        async fn replace_ingress(&self, _: &Ingress) -> anyhow::Result<Ingress> {
            unreachable!()
        }
    }

    #[async_trait]
    impl CertificateBackend for Unreachable {
        fn name(&self) -> &'static str {
            "unreachable"
        }
        async fn import_certificate(&self, _: ImportCertificateRequest) -> anyhow::Result<String> {
            unreachable!()
        }
    }

    #[test]
    fn test_error_requeues_after_configured_interval() {
        let config = ControllerConfig {
            reconciliation_error_requeue_secs: 7,
            ..ControllerConfig::default()
        };
        let ctx = Arc::new(Reconciler::new(
            Arc::new(Unreachable),
            Arc::new(Unreachable),
            config,
        ));

        let action = handle_reconciliation_error(
            Arc::new(Secret::default()),
            &ReconcilerError::Timeout(Duration::from_secs(1)),
            ctx,
        );

        assert_eq!(action, Action::requeue(Duration::from_secs(7)));
    }
}
