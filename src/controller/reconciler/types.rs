//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::certificate::PemSplitError;
use crate::controller::labels::LabelParseError;
use crate::controller::resources::ClusterResources;
use crate::provider::CertificateBackend;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures of a single reconcile cycle.
///
/// None of them is fatal to the process; the error policy requeues the secret.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("failed to fetch secret {secret}: {source:#}")]
    FetchSecret {
        secret: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{field} not found in secret data")]
    MissingField { field: &'static str },

    #[error("could not split certs: {0}")]
    Certificate(#[from] PemSplitError),

    #[error("failed to import the certificate: {0:#}")]
    Import(#[source] anyhow::Error),

    #[error("failed to update the secret: {0:#}")]
    UpdateSecret(#[source] anyhow::Error),

    #[error("failed to parse ingress labels '{labels}': {source}")]
    InvalidLabels {
        labels: String,
        #[source]
        source: LabelParseError,
    },

    #[error("ingresses not found by labels '{labels}': {source:#}")]
    ListIngresses {
        labels: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to update ingress {ingress}: {source:#}")]
    UpdateIngress {
        ingress: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("reconcile did not finish within {0:?}")]
    Timeout(Duration),
}

impl ReconcilerError {
    /// Short, stable label for logs and metrics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcilerError::FetchSecret { .. } => "fetch-secret",
            ReconcilerError::MissingField { .. } => "missing-field",
            ReconcilerError::Certificate(_) => "invalid-certificate",
            ReconcilerError::Import(_) => "import",
            ReconcilerError::UpdateSecret(_) => "update-secret",
            ReconcilerError::InvalidLabels { .. } => "invalid-labels",
            ReconcilerError::ListIngresses { .. } => "list-ingresses",
            ReconcilerError::UpdateIngress { .. } => "update-ingress",
            ReconcilerError::Timeout(_) => "timeout",
        }
    }
}

/// Shared context handed to every reconcile.
///
/// Cluster access and the certificate backend are injected so that tests can
/// substitute in-memory fakes. Both handles are safe for concurrent use.
#[derive(Clone)]
pub struct Reconciler {
    pub resources: Arc<dyn ClusterResources>,
    pub backend: Arc<dyn CertificateBackend>,
    pub config: ControllerConfig,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        resources: Arc<dyn ClusterResources>,
        backend: Arc<dyn CertificateBackend>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            resources,
            backend,
            config,
        }
    }
}
