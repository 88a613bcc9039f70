//! Contract and version records.
//!
//! A [`Contract`] is a lineage; a [`ContractVersion`] is one immutable
//! snapshot of it. Versions are append-only: the only field that may change
//! after insert is an absent ledger reference being filled in once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::NORMALIZATION_VERSION;
use crate::digest::{compute_digest, Digest, HashAlgorithm};
use crate::types::{ContractId, FileType, TenantId, VersionId, VersionLabel};

/// Opaque ledger transaction reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerTxRef(pub String);

impl LedgerTxRef {
    pub fn new(r: impl Into<String>) -> Self {
        Self(r.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerTxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A logical document lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub name: String,
    pub tenant: TenantId,
    /// Unix ms.
    pub created_at: i64,
}

/// Input for creating a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub id: ContractId,
    pub name: String,
    pub tenant: TenantId,
    pub created_at: i64,
}

impl NewContract {
    pub fn new(name: impl Into<String>, tenant: TenantId, created_at: i64) -> Self {
        Self {
            id: ContractId::new(),
            name: name.into(),
            tenant,
            created_at,
        }
    }
}

/// One registered snapshot of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractVersion {
    pub id: VersionId,
    pub contract_id: ContractId,
    pub version_number: u64,
    pub file_name: String,
    pub file_type: FileType,
    pub raw_text: String,
    #[serde(rename = "canonicalContent")]
    pub canonical_text: String,
    #[serde(rename = "contractHash")]
    pub digest: Digest,
    pub normalization_version: String,
    pub hash_algorithm: HashAlgorithm,
    #[serde(rename = "onChainTxHash")]
    pub ledger_tx: Option<LedgerTxRef>,
    /// Unix ms.
    pub created_at: i64,
}

impl ContractVersion {
    /// Boundary label, `v<N>`.
    pub fn label(&self) -> VersionLabel {
        // Stores only persist numbers >= 1.
        VersionLabel::new(self.version_number).unwrap_or(VersionLabel::MIN)
    }

    pub fn is_anchored(&self) -> bool {
        self.ledger_tx.is_some()
    }

    /// Recompute the digest from stored canonical text.
    pub fn recompute_digest(&self) -> Digest {
        compute_digest(&self.canonical_text, self.hash_algorithm)
    }

    /// Whether the stored digest still matches the stored canonical text.
    pub fn digest_is_consistent(&self) -> bool {
        self.recompute_digest() == self.digest
    }
}

/// Input for appending a version. The store assigns the number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub id: VersionId,
    pub contract_id: ContractId,
    pub file_name: String,
    pub file_type: FileType,
    pub raw_text: String,
    pub canonical_text: String,
    pub digest: Digest,
    pub normalization_version: String,
    pub hash_algorithm: HashAlgorithm,
    pub ledger_tx: Option<LedgerTxRef>,
    pub created_at: i64,
}

impl NewVersion {
    /// Build a pending (unanchored) version, computing the digest.
    pub fn from_canonical(
        contract_id: ContractId,
        file_name: impl Into<String>,
        file_type: FileType,
        raw_text: String,
        canonical_text: String,
        hash_algorithm: HashAlgorithm,
        created_at: i64,
    ) -> Self {
        let digest = compute_digest(&canonical_text, hash_algorithm);
        Self {
            id: VersionId::new(),
            contract_id,
            file_name: file_name.into(),
            file_type,
            raw_text,
            canonical_text,
            digest,
            normalization_version: NORMALIZATION_VERSION.to_string(),
            hash_algorithm,
            ledger_tx: None,
            created_at,
        }
    }

    /// Materialize with the number the store assigned.
    pub fn into_version(self, version_number: u64) -> ContractVersion {
        ContractVersion {
            id: self.id,
            contract_id: self.contract_id,
            version_number,
            file_name: self.file_name,
            file_type: self.file_type,
            raw_text: self.raw_text,
            canonical_text: self.canonical_text,
            digest: self.digest,
            normalization_version: self.normalization_version,
            hash_algorithm: self.hash_algorithm,
            ledger_tx: self.ledger_tx,
            created_at: self.created_at,
        }
    }
}
