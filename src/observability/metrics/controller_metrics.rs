//! # Controller Metrics
//!
//! Metrics for controller operations: reconciliations, imports, ingress updates, and requeues.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec};
use std::sync::LazyLock;

// Controller reconciliation metrics
static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "cert_secret_syncer_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "cert_secret_syncer_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "cert_secret_syncer_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

// Certificate propagation metrics
static CERTIFICATES_IMPORTED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "cert_secret_syncer_certificates_imported_total",
            "Total number of certificates imported into a backend",
        ),
        &["backend", "operation"],
    )
    .expect("Failed to create CERTIFICATES_IMPORTED_TOTAL metric - this should never happen")
});

static INGRESSES_UPDATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "cert_secret_syncer_ingresses_updated_total",
        "Total number of Ingress annotation updates",
    )
    .expect("Failed to create INGRESSES_UPDATED_TOTAL metric - this should never happen")
});

// Requeue metrics
static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "cert_secret_syncer_requeues_total",
            "Total number of reconciliation requeues",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register controller metrics with the registry
pub(crate) fn register_controller_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CERTIFICATES_IMPORTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INGRESSES_UPDATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_certificates_imported(backend: &str, operation: &str) {
    CERTIFICATES_IMPORTED_TOTAL
        .with_label_values(&[backend, operation])
        .inc();
}

pub fn increment_ingresses_updated(count: u64) {
    INGRESSES_UPDATED_TOTAL.inc_by(count);
}

pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert!(RECONCILIATIONS_TOTAL.get() > before);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        assert!(RECONCILIATION_ERRORS_TOTAL.get() > before);
    }

    #[test]
    fn test_increment_certificates_imported_by_operation() {
        let counter = CERTIFICATES_IMPORTED_TOTAL.with_label_values(&["test-backend", "create"]);
        let before = counter.get();
        increment_certificates_imported("test-backend", "create");
        assert_eq!(counter.get(), before + 1);
    }

    #[test]
    fn test_increment_ingresses_updated() {
        let before = INGRESSES_UPDATED_TOTAL.get();
        increment_ingresses_updated(2);
        assert!(INGRESSES_UPDATED_TOTAL.get() >= before + 2);
    }

    #[test]
    fn test_increment_requeues_total() {
        let counter = REQUEUES_TOTAL.with_label_values(&["test-reason"]);
        let before = counter.get();
        increment_requeues_total("test-reason");
        assert_eq!(counter.get(), before + 1);
    }
}
