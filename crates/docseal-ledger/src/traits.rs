//! The Ledger trait: the boundary to the external immutable registry.

use async_trait::async_trait;
use docseal_core::{ContractId, Digest, HashAlgorithm, LedgerTxRef};

use crate::error::Result;

/// A write to the ledger: the content to hash and the key to bind it under.
///
/// The ledger hashes `canonical_text` itself; we never send a precomputed
/// digest, so what is anchored is whatever the ledger computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRequest {
    pub contract_id: ContractId,
    pub version_label: String,
    pub canonical_text: String,
    pub normalization_version: String,
    pub hash_algorithm: HashAlgorithm,
}

impl AnchorRequest {
    /// Ledger key tuple as strings.
    pub fn key(&self) -> (String, String) {
        (self.contract_id.to_string(), self.version_label.clone())
    }
}

/// Async interface to the ledger.
///
/// # Design Notes
///
/// - **Write-once keys**: `(contract, label)` may be registered once. A
///   second registration fails with [`LedgerError::Rejected`](crate::LedgerError::Rejected).
/// - **Durable on return**: [`register`](Self::register) returns only after
///   the write is confirmed.
/// - **Absent is not zero**: [`fetch`](Self::fetch) returns `None` for an
///   unknown key, never [`Digest::ZERO`].
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Anchor content under `(contract, label)` and return the transaction reference.
    async fn register(&self, request: &AnchorRequest) -> Result<LedgerTxRef>;

    /// Read the digest anchored under `(contract, label)`.
    async fn fetch(&self, contract_id: &ContractId, version_label: &str) -> Result<Option<Digest>>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for std::sync::Arc<L> {
    async fn register(&self, request: &AnchorRequest) -> Result<LedgerTxRef> {
        (**self).register(request).await
    }

    async fn fetch(&self, contract_id: &ContractId, version_label: &str) -> Result<Option<Digest>> {
        (**self).fetch(contract_id, version_label).await
    }
}
