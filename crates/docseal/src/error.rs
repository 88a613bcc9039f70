//! Error types for the pipeline.

use docseal_core::{CanonicalizeError, ContractId, ContractVersion, Digest, DigestError, VersionId};
use docseal_ledger::LedgerError;
use docseal_store::StoreError;
use thiserror::Error;

/// Errors that can occur during pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Unsupported format or failed extraction.
    #[error("canonicalization error: {0}")]
    Canonicalize(#[from] CanonicalizeError),

    /// Digest error.
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Ledger error outside registration (reads, reanchoring).
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Target contract does not exist.
    #[error("contract not found: {0}")]
    ContractNotFound(ContractId),

    /// The version was persisted but could not be anchored. It carries no
    /// ledger reference and can be reanchored later.
    #[error("version {} of contract {} saved but not anchored: {source}", .version.version_number, .version.contract_id)]
    Unanchored {
        version: Box<ContractVersion>,
        #[source]
        source: LedgerError,
    },

    /// Stored canonical text no longer hashes to the stored digest.
    #[error("digest drift on version {version_id}: stored {stored}, recomputed {recomputed}")]
    DigestDrift {
        version_id: VersionId,
        stored: Digest,
        recomputed: Digest,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Blocking task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Caused by the request itself; retrying unchanged will not help.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Canonicalize(_)
                | PipelineError::Digest(DigestError::UnsupportedAlgorithm(_))
                | PipelineError::ContractNotFound(_)
                | PipelineError::Store(StoreError::NotFound(_))
        )
    }

    /// Transient; the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Ledger(e) => e.is_retryable(),
            PipelineError::Unanchored { source, .. } => source.is_retryable(),
            PipelineError::Store(StoreError::VersionConflict { .. }) => true,
            _ => false,
        }
    }

    /// The persisted-but-unanchored version, if this error left one behind.
    pub fn unanchored_version(&self) -> Option<&ContractVersion> {
        match self {
            PipelineError::Unanchored { version, .. } => Some(version.as_ref()),
            _ => None,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
