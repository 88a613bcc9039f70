//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, docseal_core::now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        2 => apply_v2(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: contracts and versions.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE contracts (
            id TEXT PRIMARY KEY,                 -- UUID
            name TEXT NOT NULL,
            tenant TEXT NOT NULL,                -- opaque owning-tenant reference
            created_at INTEGER NOT NULL          -- Unix ms
        );

        CREATE TABLE contract_versions (
            id TEXT PRIMARY KEY,                 -- UUID
            contract_id TEXT NOT NULL REFERENCES contracts(id),
            version_number INTEGER NOT NULL CHECK (version_number >= 1),
            file_name TEXT NOT NULL,
            file_type TEXT NOT NULL CHECK (file_type IN ('pdf', 'docx', 'txt')),
            raw_text TEXT NOT NULL,
            canonical_content TEXT NOT NULL,
            contract_hash TEXT NOT NULL,         -- lowercase hex, 64 chars
            normalization_version TEXT NOT NULL DEFAULT '1.0',
            hash_algorithm TEXT NOT NULL,
            on_chain_tx_hash TEXT,               -- NULL while pending or after a failed anchor
            created_at INTEGER NOT NULL,

            UNIQUE(contract_id, version_number)
        );

        CREATE INDEX idx_contracts_tenant ON contracts(tenant, created_at);
        CREATE INDEX idx_versions_unanchored ON contract_versions(contract_id)
            WHERE on_chain_tx_hash IS NULL;
        "#,
    )?;

    Ok(())
}

/// Migration v2: append-only enforcement.
///
/// Deletes are refused. Updates are refused unless they only fill a NULL
/// `on_chain_tx_hash`.
fn apply_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TRIGGER contract_versions_no_delete
        BEFORE DELETE ON contract_versions
        BEGIN
            SELECT RAISE(ABORT, 'contract versions are append-only');
        END;

        CREATE TRIGGER contract_versions_immutable
        BEFORE UPDATE ON contract_versions
        WHEN OLD.on_chain_tx_hash IS NOT NULL
            OR NEW.id IS NOT OLD.id
            OR NEW.contract_id IS NOT OLD.contract_id
            OR NEW.version_number IS NOT OLD.version_number
            OR NEW.file_name IS NOT OLD.file_name
            OR NEW.file_type IS NOT OLD.file_type
            OR NEW.raw_text IS NOT OLD.raw_text
            OR NEW.canonical_content IS NOT OLD.canonical_content
            OR NEW.contract_hash IS NOT OLD.contract_hash
            OR NEW.normalization_version IS NOT OLD.normalization_version
            OR NEW.hash_algorithm IS NOT OLD.hash_algorithm
            OR NEW.created_at IS NOT OLD.created_at
        BEGIN
            SELECT RAISE(ABORT, 'contract versions are append-only');
        END;
        "#,
    )?;

    Ok(())
}
