//! Error types for the ledger module.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while anchoring or reading anchored digests.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Network, configuration or node failure. Retrying later may succeed.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger refused the write (duplicate key, reverted transaction).
    #[error("ledger rejected the write: {0}")]
    Rejected(String),

    /// No confirmation within the allotted time. The write may still land.
    #[error("ledger unavailable: no confirmation after {0:?}")]
    Timeout(Duration),

    /// The node answered with something we could not decode.
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

impl LedgerError {
    /// Permanent for this key; retrying the same write will fail again.
    pub fn is_rejected(&self) -> bool {
        matches!(self, LedgerError::Rejected(_))
    }

    /// Transient failures worth retrying after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_) | LedgerError::Timeout(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LedgerError::InvalidResponse(e.to_string())
        } else {
            LedgerError::Unavailable(e.to_string())
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
