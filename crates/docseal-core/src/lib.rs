//! # DocSeal Core
//!
//! Pure primitives for DocSeal: canonical text, content digests, and the
//! contract/version records the rest of the workspace persists and anchors.
//!
//! This crate contains no storage and no networking.
//!
//! ## Key Types
//!
//! - [`Canonicalizer`] - Extract + normalize a document into canonical text
//! - [`TextExtractor`] - Pluggable per-format extraction strategy
//! - [`Digest`] / [`HashAlgorithm`] - Content fingerprint of canonical text
//! - [`ContractVersion`] - One immutable registered snapshot
//!
//! ## Canonicalization
//!
//! Canonical text is the sole hash input. See [`canonical`] for the
//! normalization rules; they must be reproduced exactly by any other
//! implementation that verifies against the same ledger.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod extract;
pub mod record;
pub mod types;

pub use canonical::{normalize, CanonicalDocument, Canonicalizer, NORMALIZATION_VERSION};
pub use digest::{compute_digest, digest_hex, Digest, HashAlgorithm};
pub use error::{CanonicalizeError, DigestError};
pub use extract::{
    DocxExtractor, ExtractorDeterminism, PdfExtractor, PlainTextExtractor, TextExtractor,
};
pub use record::{Contract, ContractVersion, LedgerTxRef, NewContract, NewVersion};
pub use types::{ContractId, FileType, TenantId, VersionId, VersionLabel};

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
