//! # DocSeal Ledger
//!
//! Anchoring of canonical text to an external immutable registry.
//!
//! ## Overview
//!
//! The pipeline talks to the ledger only through the [`Ledger`] trait. A
//! write binds `(contract, version label)` to the digest the ledger itself
//! computes from the submitted canonical text; a read returns that digest or
//! `None`.
//!
//! ## Key Types
//!
//! - [`Ledger`] - The async trait for anchoring and reading
//! - [`RpcLedger`] - Ethereum JSON-RPC client for the registry contract
//! - [`MemoryLedger`] - In-memory ledger with fault injection for tests
//! - [`LedgerError`] - Unavailable (retryable) vs. rejected (permanent)
//!
//! ## Design Notes
//!
//! - Keys are write-once; a duplicate registration is rejected
//! - An absent record is `None`, distinct from an all-zero digest
//! - Writes are never retried automatically

pub mod abi;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod traits;

pub use error::{LedgerError, Result};
pub use memory::{LedgerRecord, MemoryLedger, WriteFault};
pub use rpc::{RpcLedger, RpcLedgerConfig};
pub use traits::{AnchorRequest, Ledger};
