//! Verification: does a submitted document match what the ledger anchored?
//!
//! Every request ends in exactly one [`VerificationStatus`]. "Not found" and
//! "mismatch" are results, not errors; only malformed documents and storage
//! failures surface as [`PipelineError`](crate::PipelineError).

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docseal_core::{
    compute_digest, Canonicalizer, ContractId, Digest, FileType, HashAlgorithm, VersionLabel,
};
use docseal_ledger::Ledger;
use docseal_store::VersionStore;

use crate::document::canonicalize_bytes;
use crate::error::Result;

/// Version reference used when the label has no local counterpart.
pub const UNKNOWN_VERSION: &str = "unknown";

/// A document to check against a contract.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub contract_id: ContractId,
    /// Label to check, sent to the ledger verbatim. `None` means the
    /// contract's latest version.
    pub version_label: Option<String>,
    pub file_type: FileType,
    pub bytes: Bytes,
}

impl VerificationRequest {
    pub fn latest(contract_id: ContractId, file_type: FileType, bytes: impl Into<Bytes>) -> Self {
        Self {
            contract_id,
            version_label: None,
            file_type,
            bytes: bytes.into(),
        }
    }

    pub fn at_label(mut self, label: impl Into<String>) -> Self {
        self.version_label = Some(label.into());
        self
    }
}

/// Terminal outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Submitted digest equals the anchored digest.
    Verified,
    /// An anchored digest exists and differs.
    VersionMismatch,
    /// Nothing anchored under the label, or the ledger could not be read.
    NotVerified,
    /// Unknown contract, or no versions to default to.
    NotFound,
}

impl VerificationStatus {
    /// Wire name, as serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::VersionMismatch => "VERSION_MISMATCH",
            VerificationStatus::NotVerified => "NOT_VERIFIED",
            VerificationStatus::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub contract_id: ContractId,
    /// Local version id, or `"unknown"`.
    pub version_id: String,
    /// Label that was checked, if one was resolved.
    pub version_label: Option<String>,
    #[serde(rename = "submittedHash")]
    pub submitted_digest: Digest,
    #[serde(rename = "onChainHash")]
    pub anchored_digest: Option<Digest>,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl VerificationResult {
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

/// Compares submitted documents with ledger records.
pub struct VerificationEngine<S: VersionStore, L: Ledger> {
    store: Arc<S>,
    ledger: Arc<L>,
    canonicalizer: Arc<Canonicalizer>,
    hash_algorithm: HashAlgorithm,
}

impl<S: VersionStore, L: Ledger> Clone for VerificationEngine<S, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ledger: Arc::clone(&self.ledger),
            canonicalizer: Arc::clone(&self.canonicalizer),
            hash_algorithm: self.hash_algorithm,
        }
    }
}

impl<S: VersionStore, L: Ledger> VerificationEngine<S, L> {
    pub fn new(
        store: Arc<S>,
        ledger: Arc<L>,
        canonicalizer: Arc<Canonicalizer>,
        hash_algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            store,
            ledger,
            canonicalizer,
            hash_algorithm,
        }
    }

    /// Run one verification to a terminal status.
    ///
    /// The submitted document is hashed with the algorithm recorded on the
    /// version being checked. The configured algorithm applies only when no
    /// local version resolves.
    pub async fn verify(&self, request: VerificationRequest) -> Result<VerificationResult> {
        let document =
            canonicalize_bytes(&self.canonicalizer, request.bytes, request.file_type).await?;
        let contract_id = request.contract_id;

        let result = |submitted: Digest,
                      version_id: String,
                      label: Option<String>,
                      anchored: Option<Digest>,
                      status,
                      details: Option<String>| {
            VerificationResult {
                contract_id,
                version_id,
                version_label: label,
                submitted_digest: submitted,
                anchored_digest: anchored,
                status,
                details,
            }
        };

        if self.store.get_contract(&contract_id).await?.is_none() {
            return Ok(result(
                compute_digest(&document.canonical_text, self.hash_algorithm),
                UNKNOWN_VERSION.to_string(),
                request.version_label,
                None,
                VerificationStatus::NotFound,
                Some(format!("contract {} is not registered", contract_id)),
            ));
        }

        let (label, local) = match request.version_label {
            Some(label) => {
                let local = match VersionLabel::parse(&label) {
                    Some(parsed) => {
                        self.store
                            .get_version_by_number(&contract_id, parsed.number())
                            .await?
                    }
                    None => None,
                };
                (label, local)
            }
            None => match self.store.latest_version(&contract_id).await? {
                Some(latest) => (latest.label().to_string(), Some(latest)),
                None => {
                    return Ok(result(
                        compute_digest(&document.canonical_text, self.hash_algorithm),
                        UNKNOWN_VERSION.to_string(),
                        None,
                        None,
                        VerificationStatus::NotFound,
                        Some("no versions registered for this contract".to_string()),
                    ));
                }
            },
        };

        let algorithm = local
            .as_ref()
            .map_or(self.hash_algorithm, |version| version.hash_algorithm);
        let submitted = compute_digest(&document.canonical_text, algorithm);
        let version_id = local
            .map(|version| version.id.to_string())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

        let anchored = match self.ledger.fetch(&contract_id, &label).await {
            Ok(Some(digest)) => digest,
            Ok(None) => {
                return Ok(result(
                    submitted,
                    version_id,
                    Some(label.clone()),
                    None,
                    VerificationStatus::NotVerified,
                    Some(format!("no anchored digest for version {}", label)),
                ));
            }
            Err(e) => {
                warn!(
                    contract = %contract_id,
                    label = %label,
                    error = %e,
                    "ledger read failed during verification"
                );
                return Ok(result(
                    submitted,
                    version_id,
                    Some(label),
                    None,
                    VerificationStatus::NotVerified,
                    Some(format!("ledger read failed: {}", e)),
                ));
            }
        };

        let outcome = if submitted == anchored {
            result(
                submitted,
                version_id,
                Some(label),
                Some(anchored),
                VerificationStatus::Verified,
                None,
            )
        } else {
            let details =
                format!("document digest does not match the anchored digest for {}", label);
            result(
                submitted,
                version_id,
                Some(label),
                Some(anchored),
                VerificationStatus::VersionMismatch,
                Some(details),
            )
        };

        info!(
            contract = %contract_id,
            label = outcome.version_label.as_deref().unwrap_or(UNKNOWN_VERSION),
            status = %outcome.status,
            "verification complete"
        );
        Ok(outcome)
    }
}
