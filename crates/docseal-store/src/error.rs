//! Error types for the store module.

use docseal_core::{ContractId, VersionId};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Contract or version not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Another version already holds this number for the contract.
    #[error("version conflict: contract {contract_id} already has version {version_number}")]
    VersionConflict {
        contract_id: ContractId,
        version_number: u64,
    },

    /// The version already carries a ledger reference.
    #[error("version {0} is already anchored")]
    AlreadyAnchored(VersionId),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Blocking task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn contract_not_found(id: &ContractId) -> Self {
        StoreError::NotFound(format!("contract {}", id))
    }

    pub(crate) fn version_not_found(id: &VersionId) -> Self {
        StoreError::NotFound(format!("version {}", id))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
