//! # Controller
//!
//! Reconcile logic plus the pieces it is built from.

pub mod certificate;
pub mod labels;
pub mod reconciler;
pub mod resources;
pub mod server;
