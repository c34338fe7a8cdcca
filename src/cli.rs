//! # Command Line
//!
//! Flags override the matching environment variables.
//!
//! ```bash
//! cert-secret-syncer --metrics-port 9090 --health-probe-port 9091 --log-format json
//! ```

use crate::config::{ControllerConfig, LogFormat, ServerConfig};
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "cert-secret-syncer")]
#[command(about = "Imports annotated Kubernetes TLS secrets into AWS Certificate Manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Port for the Prometheus metrics endpoint
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Port for the liveness and readiness probes
    #[arg(long)]
    pub health_probe_port: Option<u16>,

    /// Log output format (text or json)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Only watch secrets in this namespace
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl Cli {
    /// Apply the flags that were given on top of the loaded configuration
    pub fn apply(&self, controller: &mut ControllerConfig, server: &mut ServerConfig) {
        if let Some(port) = self.metrics_port {
            server.metrics_port = port;
        }
        if let Some(port) = self.health_probe_port {
            server.health_probe_port = port;
        }
        if let Some(format) = self.log_format {
            controller.log_format = format;
        }
        if let Some(namespace) = &self.namespace {
            controller.watch_namespace = Some(namespace.clone());
        }
    }
}
