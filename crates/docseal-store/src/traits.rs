//! VersionStore trait: the abstract interface for contract persistence.
//!
//! This trait keeps the pipeline storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use docseal_core::{
    Contract, ContractId, ContractVersion, LedgerTxRef, NewContract, NewVersion, TenantId,
    VersionId,
};

use crate::error::Result;

/// The VersionStore trait: async interface for contracts and their versions.
///
/// # Design Notes
///
/// - **Append-only**: versions are never edited or deleted. The single
///   exception is [`record_anchor`](Self::record_anchor), which fills an
///   absent ledger reference exactly once.
/// - **Gapless numbering**: [`append`](Self::append) assigns
///   `max(version_number) + 1` and inserts in one atomic step. The
///   `(contract_id, version_number)` pair is unique at the storage layer; a
///   violation surfaces as [`StoreError::VersionConflict`](crate::StoreError::VersionConflict).
#[async_trait]
pub trait VersionStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Contract Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a contract lineage.
    async fn create_contract(&self, contract: NewContract) -> Result<Contract>;

    /// Get a contract by ID.
    async fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>>;

    /// List a tenant's contracts, newest first.
    async fn list_contracts(&self, tenant: &TenantId) -> Result<Vec<Contract>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Version Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// One more than the contract's highest version number, or 1.
    ///
    /// Informational only: [`append`](Self::append) computes the number
    /// again inside its own transaction.
    async fn next_version_number(&self, contract_id: &ContractId) -> Result<u64>;

    /// Append a version, assigning the next number atomically.
    ///
    /// # Returns
    /// - The persisted version with its number.
    /// - `NotFound` if the contract does not exist.
    /// - `VersionConflict` if a concurrent writer took the number.
    async fn append(&self, version: NewVersion) -> Result<ContractVersion>;

    /// List a contract's versions, newest first.
    async fn list_versions(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>>;

    /// Get a version by ID. `NotFound` if absent.
    async fn get_version(&self, id: &VersionId) -> Result<ContractVersion>;

    /// Get a version by its number within a contract.
    async fn get_version_by_number(
        &self,
        contract_id: &ContractId,
        version_number: u64,
    ) -> Result<Option<ContractVersion>>;

    /// The contract's highest-numbered version.
    async fn latest_version(&self, contract_id: &ContractId) -> Result<Option<ContractVersion>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Anchor Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the ledger reference for a version that has none.
    ///
    /// `AlreadyAnchored` if a reference is present; it is never overwritten.
    async fn record_anchor(&self, id: &VersionId, tx: &LedgerTxRef) -> Result<ContractVersion>;

    /// Versions of a contract with no ledger reference, oldest first.
    async fn list_unanchored(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>>;
}

#[async_trait]
impl<S: VersionStore + ?Sized> VersionStore for std::sync::Arc<S> {
    async fn create_contract(&self, contract: NewContract) -> Result<Contract> {
        (**self).create_contract(contract).await
    }

    async fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>> {
        (**self).get_contract(id).await
    }

    async fn list_contracts(&self, tenant: &TenantId) -> Result<Vec<Contract>> {
        (**self).list_contracts(tenant).await
    }

    async fn next_version_number(&self, contract_id: &ContractId) -> Result<u64> {
        (**self).next_version_number(contract_id).await
    }

    async fn append(&self, version: NewVersion) -> Result<ContractVersion> {
        (**self).append(version).await
    }

    async fn list_versions(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        (**self).list_versions(contract_id).await
    }

    async fn get_version(&self, id: &VersionId) -> Result<ContractVersion> {
        (**self).get_version(id).await
    }

    async fn get_version_by_number(
        &self,
        contract_id: &ContractId,
        version_number: u64,
    ) -> Result<Option<ContractVersion>> {
        (**self)
            .get_version_by_number(contract_id, version_number)
            .await
    }

    async fn latest_version(&self, contract_id: &ContractId) -> Result<Option<ContractVersion>> {
        (**self).latest_version(contract_id).await
    }

    async fn record_anchor(&self, id: &VersionId, tx: &LedgerTxRef) -> Result<ContractVersion> {
        (**self).record_anchor(id, tx).await
    }

    async fn list_unanchored(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        (**self).list_unanchored(contract_id).await
    }
}
