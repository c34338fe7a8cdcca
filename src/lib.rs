//! # cert-secret-syncer
//!
//! A Kubernetes controller that imports TLS secrets into AWS Certificate
//! Manager and hands the resulting certificate ARN to the AWS load balancer
//! controller through Ingress annotations.
//!
//! ## Overview
//!
//! 1. **Watching Secrets** - every Secret change triggers a reconcile
//! 2. **Opt-in by annotation** - only secrets annotated with
//!    `cert-secret-syncer/backend: ACM` are imported
//! 3. **Certificate import** - `tls.crt` is split into leaf and chain and
//!    imported together with `tls.key`
//! 4. **ARN write-back** - the ARN is stored on the secret so later imports
//!    replace the same certificate
//! 5. **Ingress propagation** - ingresses matching the
//!    `cert-secret-syncer/ingress-labels` selector receive the ARN annotation

pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod provider;
pub mod runtime;
