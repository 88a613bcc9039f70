//! SQLite implementation of the VersionStore trait.
//!
//! This is the primary storage backend for DocSeal. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use docseal_core::{
    Contract, ContractId, ContractVersion, Digest, FileType, HashAlgorithm, LedgerTxRef,
    NewContract, NewVersion, TenantId, VersionId,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::VersionStore;

const VERSION_COLUMNS: &str = "id, contract_id, version_number, file_name, file_type, raw_text,
     canonical_content, contract_hash, normalization_version, hash_algorithm,
     on_chain_tx_hash, created_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn conversion_error(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

// Helper to convert a row to Contract
fn row_to_contract(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contract> {
    let id: String = row.get("id")?;
    Ok(Contract {
        id: ContractId::parse(&id).map_err(|e| conversion_error(0, e))?,
        name: row.get("name")?,
        tenant: TenantId(row.get("tenant")?),
        created_at: row.get("created_at")?,
    })
}

// Helper to convert a row to ContractVersion
fn row_to_version(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContractVersion> {
    let id: String = row.get("id")?;
    let contract_id: String = row.get("contract_id")?;
    let version_number: i64 = row.get("version_number")?;
    let file_type: String = row.get("file_type")?;
    let digest: String = row.get("contract_hash")?;
    let algorithm: String = row.get("hash_algorithm")?;
    let tx: Option<String> = row.get("on_chain_tx_hash")?;

    Ok(ContractVersion {
        id: VersionId::parse(&id).map_err(|e| conversion_error(0, e))?,
        contract_id: ContractId::parse(&contract_id).map_err(|e| conversion_error(1, e))?,
        version_number: version_number as u64,
        file_name: row.get("file_name")?,
        file_type: FileType::from_declared(&file_type).map_err(|e| conversion_error(4, e))?,
        raw_text: row.get("raw_text")?,
        canonical_text: row.get("canonical_content")?,
        digest: Digest::from_hex(&digest).map_err(|e| conversion_error(7, e))?,
        normalization_version: row.get("normalization_version")?,
        hash_algorithm: HashAlgorithm::from_tag(&algorithm).map_err(|e| conversion_error(9, e))?,
        ledger_tx: tx.map(LedgerTxRef),
        created_at: row.get("created_at")?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn select_versions(
    conn: &Connection,
    sql_tail: &str,
    contract_id: &ContractId,
) -> Result<Vec<ContractVersion>> {
    let sql = format!("SELECT {} FROM contract_versions {}", VERSION_COLUMNS, sql_tail);
    let mut stmt = conn.prepare(&sql)?;
    let versions = stmt
        .query_map(params![contract_id.to_string()], row_to_version)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(versions)
}

#[async_trait]
impl VersionStore for SqliteStore {
    async fn create_contract(&self, contract: NewContract) -> Result<Contract> {
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO contracts (id, name, tenant, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    contract.id.to_string(),
                    contract.name,
                    contract.tenant.as_str(),
                    contract.created_at
                ],
            )?;
            Ok(Contract {
                id: contract.id,
                name: contract.name,
                tenant: contract.tenant,
                created_at: contract.created_at,
            })
        })
        .await
    }

    async fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>> {
        let id = *id;
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, name, tenant, created_at FROM contracts WHERE id = ?1",
                params![id.to_string()],
                row_to_contract,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_contracts(&self, tenant: &TenantId) -> Result<Vec<Contract>> {
        let tenant = tenant.clone();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, tenant, created_at FROM contracts
                 WHERE tenant = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let contracts = stmt
                .query_map(params![tenant.as_str()], row_to_contract)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(contracts)
        })
        .await
    }

    async fn next_version_number(&self, contract_id: &ContractId) -> Result<u64> {
        let contract_id = *contract_id;
        self.run(move |conn| {
            let next: i64 = conn.query_row(
                "SELECT COALESCE(MAX(version_number), 0) + 1 FROM contract_versions
                 WHERE contract_id = ?1",
                params![contract_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(next as u64)
        })
        .await
    }

    async fn append(&self, version: NewVersion) -> Result<ContractVersion> {
        self.run(move |conn| {
            // IMMEDIATE takes the write lock up front, so read-max and insert
            // see the same snapshot even with other processes on the file.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let contract_key = version.contract_id.to_string();

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM contracts WHERE id = ?1",
                    params![contract_key],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::contract_not_found(&version.contract_id));
            }

            let number: i64 = tx.query_row(
                "SELECT COALESCE(MAX(version_number), 0) + 1 FROM contract_versions
                 WHERE contract_id = ?1",
                params![contract_key],
                |row| row.get(0),
            )?;

            let inserted = tx.execute(
                "INSERT INTO contract_versions (
                    id, contract_id, version_number, file_name, file_type, raw_text,
                    canonical_content, contract_hash, normalization_version, hash_algorithm,
                    on_chain_tx_hash, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    version.id.to_string(),
                    contract_key,
                    number,
                    version.file_name,
                    version.file_type.as_str(),
                    version.raw_text,
                    version.canonical_text,
                    version.digest.to_hex(),
                    version.normalization_version,
                    version.hash_algorithm.tag(),
                    version.ledger_tx.as_ref().map(|t| t.as_str()),
                    version.created_at,
                ],
            );

            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(StoreError::VersionConflict {
                        contract_id: version.contract_id,
                        version_number: number as u64,
                    });
                }
                Err(e) => return Err(e.into()),
            }

            tx.commit()?;
            Ok(version.into_version(number as u64))
        })
        .await
    }

    async fn list_versions(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        let contract_id = *contract_id;
        self.run(move |conn| {
            select_versions(
                conn,
                "WHERE contract_id = ?1 ORDER BY version_number DESC",
                &contract_id,
            )
        })
        .await
    }

    async fn get_version(&self, id: &VersionId) -> Result<ContractVersion> {
        let id = *id;
        self.run(move |conn| {
            let sql = format!("SELECT {} FROM contract_versions WHERE id = ?1", VERSION_COLUMNS);
            conn.query_row(&sql, params![id.to_string()], row_to_version)
                .optional()?
                .ok_or_else(|| StoreError::version_not_found(&id))
        })
        .await
    }

    async fn get_version_by_number(
        &self,
        contract_id: &ContractId,
        version_number: u64,
    ) -> Result<Option<ContractVersion>> {
        let contract_id = *contract_id;
        self.run(move |conn| {
            let sql = format!(
                "SELECT {} FROM contract_versions WHERE contract_id = ?1 AND version_number = ?2",
                VERSION_COLUMNS
            );
            conn.query_row(
                &sql,
                params![contract_id.to_string(), version_number as i64],
                row_to_version,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn latest_version(&self, contract_id: &ContractId) -> Result<Option<ContractVersion>> {
        let contract_id = *contract_id;
        self.run(move |conn| {
            let sql = format!(
                "SELECT {} FROM contract_versions WHERE contract_id = ?1
                 ORDER BY version_number DESC LIMIT 1",
                VERSION_COLUMNS
            );
            conn.query_row(&sql, params![contract_id.to_string()], row_to_version)
                .optional()
                .map_err(StoreError::from)
        })
        .await
    }

    async fn record_anchor(&self, id: &VersionId, tx_ref: &LedgerTxRef) -> Result<ContractVersion> {
        let id = *id;
        let tx_ref = tx_ref.clone();
        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let updated = tx.execute(
                "UPDATE contract_versions SET on_chain_tx_hash = ?1
                 WHERE id = ?2 AND on_chain_tx_hash IS NULL",
                params![tx_ref.as_str(), id.to_string()],
            )?;

            let sql = format!("SELECT {} FROM contract_versions WHERE id = ?1", VERSION_COLUMNS);
            let version = tx
                .query_row(&sql, params![id.to_string()], row_to_version)
                .optional()?
                .ok_or_else(|| StoreError::version_not_found(&id))?;

            if updated == 0 {
                return Err(StoreError::AlreadyAnchored(id));
            }

            tx.commit()?;
            Ok(version)
        })
        .await
    }

    async fn list_unanchored(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        let contract_id = *contract_id;
        self.run(move |conn| {
            select_versions(
                conn,
                "WHERE contract_id = ?1 AND on_chain_tx_hash IS NULL ORDER BY version_number ASC",
                &contract_id,
            )
        })
        .await
    }
}
