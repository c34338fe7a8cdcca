//! # Certificate Bundle
//!
//! Splits a concatenated PEM buffer (leaf certificate followed by zero or more
//! chain certificates) into individually encoded certificates.
//!
//! Every block must be a header-less `CERTIFICATE` block holding a well-formed
//! X.509 certificate. Blocks are re-encoded in canonical form (LF line endings,
//! 64-column base64) and kept in input order: the first one is the leaf, the
//! remainder is the chain.

use pem::{EncodeConfig, LineEnding, Pem};
use thiserror::Error;

/// PEM tag accepted by the splitter
const CERTIFICATE_TAG: &str = "CERTIFICATE";

#[derive(Debug, Error)]
pub enum PemSplitError {
    #[error("no certificates found")]
    NoCertificates,

    #[error("failed to decode PEM data: {0}")]
    Decode(#[from] pem::PemError),

    #[error("PEM block {index} has type '{tag}', expected a CERTIFICATE block")]
    UnexpectedBlockType { index: usize, tag: String },

    #[error("PEM block {index} carries headers, expected a plain CERTIFICATE block")]
    UnexpectedHeaders { index: usize },

    #[error("failed to parse certificate in PEM block {index}: {reason}")]
    InvalidCertificate { index: usize, reason: String },
}

/// Leaf certificate plus chain, each element a single PEM-encoded certificate.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    certificates: Vec<Vec<u8>>,
    leaf_subject: String,
    leaf_not_after: Option<chrono::DateTime<chrono::Utc>>,
}

impl CertificateBundle {
    /// The end-entity certificate
    #[must_use]
    pub fn leaf(&self) -> &[u8] {
        &self.certificates[0]
    }

    /// Intermediate certificates in input order
    #[must_use]
    pub fn chain(&self) -> &[Vec<u8>] {
        &self.certificates[1..]
    }

    /// Chain certificates concatenated into one PEM buffer, or `None` for a lone leaf
    #[must_use]
    pub fn chain_pem(&self) -> Option<Vec<u8>> {
        let chain = self.chain();
        if chain.is_empty() {
            return None;
        }
        Some(chain.concat())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Distinguished name of the leaf subject
    #[must_use]
    pub fn leaf_subject(&self) -> &str {
        &self.leaf_subject
    }

    /// Expiry of the leaf certificate
    #[must_use]
    pub fn leaf_not_after(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.leaf_not_after
    }
}

/// Split a PEM buffer into validated single-certificate PEM buffers.
///
/// # Errors
///
/// Fails when the buffer contains no PEM blocks, when a block cannot be decoded,
/// is not a header-less `CERTIFICATE` block, or does not hold a valid X.509
/// certificate. A single bad block fails the whole call.
pub fn split_pem_certificates(pem_bytes: &[u8]) -> Result<CertificateBundle, PemSplitError> {
    let blocks = pem::parse_many(pem_bytes)?;

    let mut certificates = Vec::with_capacity(blocks.len());
    let mut leaf_subject = String::new();
    let mut leaf_not_after = None;

    for (index, block) in blocks.iter().enumerate() {
        if block.tag() != CERTIFICATE_TAG {
            return Err(PemSplitError::UnexpectedBlockType {
                index,
                tag: block.tag().to_string(),
            });
        }
        if block.headers().iter().next().is_some() {
            return Err(PemSplitError::UnexpectedHeaders { index });
        }

        let (remainder, certificate) = x509_parser::parse_x509_certificate(block.contents())
            .map_err(|e| PemSplitError::InvalidCertificate {
                index,
                reason: e.to_string(),
            })?;
        if !remainder.is_empty() {
            return Err(PemSplitError::InvalidCertificate {
                index,
                reason: format!("{} trailing bytes after certificate", remainder.len()),
            });
        }

        if index == 0 {
            leaf_subject = certificate.subject().to_string();
            leaf_not_after =
                chrono::DateTime::from_timestamp(certificate.validity().not_after.timestamp(), 0);
        }

        certificates.push(encode_certificate(block.contents()));
    }

    if certificates.is_empty() {
        return Err(PemSplitError::NoCertificates);
    }

    Ok(CertificateBundle {
        certificates,
        leaf_subject,
        leaf_not_after,
    })
}

/// Canonical PEM encoding of a DER certificate
#[must_use]
pub fn encode_certificate(der: &[u8]) -> Vec<u8> {
    let block = Pem::new(CERTIFICATE_TAG, der.to_vec());
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF)).into_bytes()
}
