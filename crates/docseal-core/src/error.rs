//! Error types for DocSeal core.

use thiserror::Error;

/// Errors raised while turning document bytes into canonical text.
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// Declared type outside `{pdf, docx, txt}`.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The extractor could not produce text (corrupt, encrypted, not UTF-8).
    #[error("text extraction failed for {file_type}: {reason}")]
    Extraction {
        file_type: &'static str,
        reason: String,
    },
}

impl CanonicalizeError {
    pub fn extraction(file_type: &'static str, reason: impl Into<String>) -> Self {
        CanonicalizeError::Extraction {
            file_type,
            reason: reason.into(),
        }
    }
}

/// Errors from digest computation and parsing.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid digest encoding: {0}")]
    InvalidEncoding(String),
}
