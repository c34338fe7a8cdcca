//! # HTTP Server
//!
//! HTTP servers for metrics and Kubernetes probes.
//!
//! Provides endpoints:
//! - `/metrics` - Prometheus metrics in text format (metrics port, 8080 by default)
//! - `/healthz` - Liveness probe, always 200 (probe port, 8081 by default)
//! - `/readyz` - Readiness probe, 200 once the controller is ready (probe port)

use crate::observability::metrics;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Number of listeners started by [`start_servers`]
const LISTENER_COUNT: usize = 2;

/// Readiness shared between the servers and the watch loop
#[derive(Debug, Default)]
pub struct ServerState {
    /// Flipped on once every listener is bound; off again on shutdown
    pub is_ready: AtomicBool,
    bound_listeners: AtomicUsize,
}

impl ServerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::Relaxed)
    }

    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::Relaxed);
    }

    fn listener_bound(&self) {
        if self.bound_listeners.fetch_add(1, Ordering::Relaxed) + 1 == LISTENER_COUNT {
            self.set_ready(true);
        }
    }
}

/// Router serving `/metrics`
pub fn metrics_router() -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
}

/// Router serving `/healthz` and `/readyz`
pub fn probe_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(state)
}

/// Bind and serve the metrics and probe listeners until either one fails.
///
/// Readiness is set once both listeners are bound.
///
/// # Errors
///
/// Returns bind or serve errors from either listener.
pub async fn start_servers(
    metrics_port: u16,
    health_probe_port: u16,
    state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let metrics_listener = bind(metrics_port, "metrics").await?;
    state.listener_bound();
    let probe_listener = bind(health_probe_port, "health probe").await?;
    state.listener_bound();

    tokio::try_join!(
        async { axum::serve(metrics_listener, metrics_router()).await },
        async { axum::serve(probe_listener, probe_router(state)).await },
    )?;

    Ok(())
}

async fn bind(port: u16, purpose: &str) -> Result<TcpListener, anyhow::Error> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("{} server listening on {}", purpose, addr);
    Ok(listener)
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::encode_metrics() {
        Ok(buffer) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {e}").into_bytes(),
            )
        }
    }
}

async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn readyz_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
