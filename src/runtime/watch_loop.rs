//! # Watch Loop
//!
//! Controller watch loop that monitors Secrets and triggers reconciliation
//! when changes are detected.

use crate::controller::reconciler::{reconcile, Reconciler, ReconcilerError};
use crate::controller::resources::SecretRef;
use crate::controller::server::ServerState;
use crate::runtime::error_policy::{handle_reconciliation_error, log_controller_event};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube_runtime::{controller, controller::Action, watcher, Controller};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Run the controller watch loop until a shutdown signal arrives
pub async fn run_watch_loop(
    secrets: Api<Secret>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let concurrency = reconciler.config.max_concurrent_reconciliations;

    // Readiness is withdrawn on the first signal; the controller drains separately
    tokio::spawn(mark_not_ready_on_signal(
        shutdown_signal(),
        Arc::clone(&server_state),
    ));

    let watch_span = tracing::span!(
        tracing::Level::INFO,
        "controller.watch",
        operation = "watch_loop",
        concurrency = concurrency
    );

    async move {
        info!("Starting controller watch loop...");
        Controller::new(secrets, watcher::Config::default())
            .with_config(controller::Config::default().concurrency(concurrency))
            .shutdown_on_signal()
            .run(reconcile_object, handle_reconciliation_error, reconciler)
            .for_each(|event| {
                log_controller_event(&event);
                futures::future::ready(())
            })
            .await;
    }
    .instrument(watch_span)
    .await;

    server_state.set_ready(false);
    info!("Controller stopped gracefully");
    Ok(())
}

/// Resolve with the name of the first termination signal received
async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| "SIGINT")
    }
}

async fn mark_not_ready_on_signal<F>(signal: F, server_state: Arc<ServerState>)
where
    F: Future<Output = std::io::Result<&'static str>>,
{
    match signal.await {
        Ok(name) => {
            info!("Received {}, initiating graceful shutdown...", name);
            server_state.set_ready(false);
            info!("Marked server as not ready, waiting for in-flight reconciliations to complete...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for shutdown signals, readiness stays unchanged until the watch loop exits: {}",
                e
            );
        }
    }
}

async fn reconcile_object(
    obj: Arc<Secret>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let Some(secret_ref) = SecretRef::from_secret(&obj) else {
        debug!("Skipping secret without a name");
        return Ok(Action::await_change());
    };
    reconcile(secret_ref, ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_state() -> Arc<ServerState> {
        let state = Arc::new(ServerState::new());
        state.set_ready(true);
        state
    }

    #[tokio::test]
    async fn test_signal_withdraws_readiness() {
        let state = ready_state();
        mark_not_ready_on_signal(async { Ok("SIGTERM") }, Arc::clone(&state)).await;
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_signal_registration_failure_keeps_readiness() {
        let state = ready_state();
        mark_not_ready_on_signal(
            async { Err(std::io::Error::other("signal driver unavailable")) },
            Arc::clone(&state),
        )
        .await;
        assert!(state.is_ready());
    }
}
