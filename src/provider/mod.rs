//! # Provider Modules
//!
//! Certificate backends that TLS secrets can be imported into.
//!
//! Each backend implements [`CertificateBackend`]. The reconciler receives the
//! backend as a constructor argument so tests can substitute a fake.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

pub mod aws;

/// Backends a secret can opt into via the backend annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// AWS Certificate Manager
    Acm,
}

impl BackendKind {
    /// Annotation value selecting this backend
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Acm => "ACM",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    /// Values are matched exactly, as written in the annotation
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACM" => Ok(BackendKind::Acm),
            other => Err(format!("unrecognized certificate backend '{other}'")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate material and optional update target for one import call
#[derive(Clone)]
pub struct ImportCertificateRequest {
    /// Leaf certificate, PEM
    pub certificate: Vec<u8>,
    /// Intermediate certificates, concatenated PEM
    pub certificate_chain: Option<Vec<u8>>,
    /// Private key, PEM. Wiped on drop.
    pub private_key: Zeroizing<Vec<u8>>,
    /// Existing certificate identifier to re-import into.
    /// `None` lets the backend allocate a new identifier.
    pub certificate_arn: Option<String>,
}

impl fmt::Debug for ImportCertificateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportCertificateRequest")
            .field("certificate_len", &self.certificate.len())
            .field(
                "certificate_chain_len",
                &self.certificate_chain.as_ref().map(Vec::len),
            )
            .field("private_key", &"***")
            .field("certificate_arn", &self.certificate_arn)
            .finish()
    }
}

/// Provider trait for certificate management services
#[async_trait]
pub trait CertificateBackend: Send + Sync {
    /// Short provider name used in logs and metrics labels
    fn name(&self) -> &'static str;

    /// Import a certificate, or re-import into `request.certificate_arn` when set.
    ///
    /// Returns the identifier of the imported certificate.
    async fn import_certificate(&self, request: ImportCertificateRequest) -> Result<String>;
}
