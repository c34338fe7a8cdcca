//! # Reconciler
//!
//! Imports annotated TLS secrets into the certificate backend and propagates
//! the resulting ARN to matching ingresses.
//!
//! ## Sub-modules
//!
//! - `types` - Reconciler context and error type
//! - `reconcile` - The reconcile cycle
//! - `ingress` - ARN propagation onto Ingress resources

pub mod ingress;
pub mod reconcile;
pub mod types;

pub use reconcile::{reconcile, reconcile_secret};
pub use types::{Reconciler, ReconcilerError};
