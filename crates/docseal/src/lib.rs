//! # DocSeal
//!
//! The unified API for document integrity: register documents as contract
//! versions, anchor their digests to an immutable ledger, and verify later
//! submissions against what was anchored.
//!
//! ## Overview
//!
//! - **Canonicalization**: PDF, DOCX and plain text become byte-stable text
//! - **Digests**: Keccak-256 (default), SHA-256 or BLAKE3 over canonical text
//! - **Versions**: Append-only, gapless per contract, persisted before anchoring
//! - **Verification**: One of `VERIFIED`, `VERSION_MISMATCH`, `NOT_VERIFIED`, `NOT_FOUND`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docseal::{DocumentUpload, Pipeline, PipelineConfig, VerificationRequest};
//! use docseal::core::{FileType, TenantId};
//! use docseal::ledger::MemoryLedger;
//! use docseal::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("docseal.db").unwrap();
//!     let pipeline = Pipeline::new(store, MemoryLedger::new(), PipelineConfig::default()).unwrap();
//!
//!     let upload = DocumentUpload::new(TenantId::new("acme"), "nda.txt", FileType::Txt, "Hello World");
//!     let registration = pipeline.register(upload).await.unwrap();
//!
//!     let request = VerificationRequest::latest(registration.contract_id, FileType::Txt, "Hello World");
//!     let result = pipeline.verify(request).await.unwrap();
//!     assert!(result.is_verified());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docseal::core` - Canonicalization, digests, records
//! - `docseal::store` - VersionStore and SQLite
//! - `docseal::ledger` - Ledger trait, JSON-RPC client

pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod verify;

// Re-export component crates
pub use docseal_core as core;
pub use docseal_ledger as ledger;
pub use docseal_store as store;

// Re-export main types for convenience
pub use config::PipelineConfig;
pub use document::DocumentUpload;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, ReconcileFailure, ReconcileReport, Registration};
pub use verify::{
    VerificationEngine, VerificationRequest, VerificationResult, VerificationStatus,
    UNKNOWN_VERSION,
};

// Re-export commonly used core types
pub use docseal_core::{
    Contract, ContractId, ContractVersion, Digest, FileType, HashAlgorithm, LedgerTxRef, TenantId,
    VersionId, VersionLabel,
};
