//! # DocSeal Store
//!
//! Persistence for contracts and their versions. Provides a trait-based
//! interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The pipeline talks to storage only through the [`VersionStore`] trait.
//! The primary implementation is [`SqliteStore`], with [`MemoryStore`] for
//! tests.
//!
//! ## Key Types
//!
//! - [`VersionStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`StoreError`] - Storage failures, including version conflicts
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docseal_core::{NewContract, TenantId};
//! use docseal_store::{SqliteStore, VersionStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("docseal.db").unwrap();
//!     let contract = store
//!         .create_contract(NewContract::new("lease.pdf", TenantId::new("acme"), 0))
//!         .await
//!         .unwrap();
//!     assert_eq!(store.next_version_number(&contract.id).await.unwrap(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Gapless numbering**: version numbers are assigned inside the store,
//!   never by the caller
//! - **Unique positions**: `(contract_id, version_number)` is enforced by an index
//! - **Append-only**: a version row changes once at most, when its ledger
//!   reference is filled

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::VersionStore;
