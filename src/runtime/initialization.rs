//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, Kubernetes client setup and the ACM backend.

use crate::config::{AcmConfig, ControllerConfig, ServerConfig};
use crate::constants;
use crate::controller::reconciler::Reconciler;
use crate::controller::resources::KubeResources;
use crate::controller::server::{start_servers, ServerState};
use crate::observability;
use crate::provider::aws::AwsCertificateManager;
use anyhow::{anyhow, Context, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{api::Api, Client};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Secrets to watch, cluster-wide or in `WATCH_NAMESPACE`
    pub secrets: Api<Secret>,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("reconciler", &self.reconciler)
            .field("server_state", &self.server_state)
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - ACM client creation
/// - Reconciler setup
pub async fn initialize(
    controller_config: ControllerConfig,
    server_config: &ServerConfig,
    acm_config: &AcmConfig,
) -> Result<InitializationResult> {
    // Must happen before any rustls client is built
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_existing| anyhow!("a rustls crypto provider is already installed"))?;

    observability::logging::init_tracing(&controller_config)?;

    info!("Starting {}", constants::CONTROLLER_NAME);
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    log_usage_banner();

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::new());
    let server_state_clone = Arc::clone(&server_state);
    let metrics_port = server_config.metrics_port;
    let health_probe_port = server_config.health_probe_port;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_servers(metrics_port, health_probe_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    wait_for_server_ready(&server_state, &server_handle, server_config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let secrets: Api<Secret> = match &controller_config.watch_namespace {
        Some(namespace) => {
            info!("Watching secrets in namespace {}", namespace);
            Api::namespaced(client.clone(), namespace)
        }
        None => {
            info!("Watching secrets in all namespaces");
            Api::all(client.clone())
        }
    };

    let backend = AwsCertificateManager::new(acm_config)
        .await
        .context("Failed to create ACM client")?;

    let reconciler = Arc::new(Reconciler::new(
        Arc::new(KubeResources::new(client)),
        Arc::new(backend),
        controller_config,
    ));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        secrets,
        reconciler,
        server_state,
    })
}

fn log_usage_banner() {
    info!("Annotate TLS secrets to have them imported:");
    info!("  {}: ACM", constants::BACKEND_ANNOTATION);
    info!(
        "  {}: <label>=<value>[,<label>=<value>] (optional)",
        constants::INGRESS_LABELS_ANNOTATION
    );
    info!(
        "The certificate ARN is written to {} on the secret and on matching ingresses",
        constants::CERTIFICATE_ARN_ANNOTATION
    );
}

/// Wait for the HTTP servers to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    server_config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = server_config.startup_timeout();
    let poll_interval = server_config.poll_interval();
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP servers are ready and accepting connections");
            break;
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}
