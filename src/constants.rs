//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! Annotation and data keys define the contract with users of the controller.
//! Timing and port values are defaults that can be overridden via
//! environment variables (see [`crate::config`]).

/// Controller name, used for logging and as the field manager identity
pub const CONTROLLER_NAME: &str = "cert-secret-syncer";

/// Secret annotation selecting the certificate backend
pub const BACKEND_ANNOTATION: &str = "cert-secret-syncer/backend";

/// Secret annotation holding the ingress label selector (`key=value,key2=value2`)
pub const INGRESS_LABELS_ANNOTATION: &str = "cert-secret-syncer/ingress-labels";

/// Annotation holding the imported certificate ARN.
/// Written on the secret after the first import and on every matching Ingress.
/// Uses the AWS Load Balancer Controller key so ALB ingresses pick it up directly.
pub const CERTIFICATE_ARN_ANNOTATION: &str = "alb.ingress.kubernetes.io/certificate-arn";

/// Secret data key holding the leaf certificate followed by its chain
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Secret data key holding the private key
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Default HTTP port for the Prometheus metrics endpoint
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP port for liveness and readiness probes
pub const DEFAULT_HEALTH_PROBE_PORT: u16 = 8081;

/// Default HTTP server startup timeout (how long to wait for servers to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default requeue interval after a reconcile completes (seconds)
pub const DEFAULT_REQUEUE_SECS: u64 = 60;

/// Default requeue interval for reconciliation errors (seconds)
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Default upper bound for a single reconcile (seconds)
pub const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 120;

/// Default number of secrets reconciled in parallel
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;
