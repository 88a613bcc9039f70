//! In-memory implementation of the VersionStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use docseal_core::{
    Contract, ContractId, ContractVersion, LedgerTxRef, NewContract, NewVersion, TenantId,
    VersionId,
};

use crate::error::{Result, StoreError};
use crate::traits::VersionStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; the
/// write lock is held across read-max-and-insert, which serializes number
/// assignment the way a database transaction would.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Contracts indexed by ID.
    contracts: HashMap<ContractId, Contract>,

    /// Versions indexed by ID.
    versions: HashMap<VersionId, ContractVersion>,

    /// Position index: contract -> (version_number -> version_id).
    positions: HashMap<ContractId, BTreeMap<u64, VersionId>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    fn versions_of(&self, contract_id: &ContractId) -> Vec<ContractVersion> {
        self.positions
            .get(contract_id)
            .map(|by_number| {
                by_number
                    .values()
                    .filter_map(|id| self.versions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn max_number(&self, contract_id: &ContractId) -> u64 {
        self.positions
            .get(contract_id)
            .and_then(|by_number| by_number.keys().next_back().copied())
            .unwrap_or(0)
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn create_contract(&self, contract: NewContract) -> Result<Contract> {
        let mut inner = self.write()?;
        if inner.contracts.contains_key(&contract.id) {
            return Err(StoreError::InvalidData(format!(
                "contract {} already exists",
                contract.id
            )));
        }

        let created = Contract {
            id: contract.id,
            name: contract.name,
            tenant: contract.tenant,
            created_at: contract.created_at,
        };
        inner.contracts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>> {
        Ok(self.read()?.contracts.get(id).cloned())
    }

    async fn list_contracts(&self, tenant: &TenantId) -> Result<Vec<Contract>> {
        let inner = self.read()?;
        let mut contracts: Vec<Contract> = inner
            .contracts
            .values()
            .filter(|c| &c.tenant == tenant)
            .cloned()
            .collect();
        contracts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(contracts)
    }

    async fn next_version_number(&self, contract_id: &ContractId) -> Result<u64> {
        Ok(self.read()?.max_number(contract_id) + 1)
    }

    async fn append(&self, version: NewVersion) -> Result<ContractVersion> {
        let mut inner = self.write()?;

        if !inner.contracts.contains_key(&version.contract_id) {
            return Err(StoreError::contract_not_found(&version.contract_id));
        }
        if inner.versions.contains_key(&version.id) {
            return Err(StoreError::InvalidData(format!(
                "version {} already exists",
                version.id
            )));
        }

        let contract_id = version.contract_id;
        let number = inner.max_number(&contract_id) + 1;
        let by_number = inner.positions.entry(contract_id).or_default();
        if by_number.contains_key(&number) {
            return Err(StoreError::VersionConflict {
                contract_id,
                version_number: number,
            });
        }
        by_number.insert(number, version.id);

        let persisted = version.into_version(number);
        inner.versions.insert(persisted.id, persisted.clone());
        Ok(persisted)
    }

    async fn list_versions(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        let mut versions = self.read()?.versions_of(contract_id);
        versions.reverse();
        Ok(versions)
    }

    async fn get_version(&self, id: &VersionId) -> Result<ContractVersion> {
        self.read()?
            .versions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::version_not_found(id))
    }

    async fn get_version_by_number(
        &self,
        contract_id: &ContractId,
        version_number: u64,
    ) -> Result<Option<ContractVersion>> {
        let inner = self.read()?;
        Ok(inner
            .positions
            .get(contract_id)
            .and_then(|by_number| by_number.get(&version_number))
            .and_then(|id| inner.versions.get(id))
            .cloned())
    }

    async fn latest_version(&self, contract_id: &ContractId) -> Result<Option<ContractVersion>> {
        let inner = self.read()?;
        Ok(inner
            .positions
            .get(contract_id)
            .and_then(|by_number| by_number.values().next_back())
            .and_then(|id| inner.versions.get(id))
            .cloned())
    }

    async fn record_anchor(&self, id: &VersionId, tx: &LedgerTxRef) -> Result<ContractVersion> {
        let mut inner = self.write()?;
        let version = inner
            .versions
            .get_mut(id)
            .ok_or_else(|| StoreError::version_not_found(id))?;

        if version.ledger_tx.is_some() {
            return Err(StoreError::AlreadyAnchored(*id));
        }
        version.ledger_tx = Some(tx.clone());
        Ok(version.clone())
    }

    async fn list_unanchored(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        Ok(self
            .read()?
            .versions_of(contract_id)
            .into_iter()
            .filter(|v| !v.is_anchored())
            .collect())
    }
}
