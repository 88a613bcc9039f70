//! The Pipeline: registration, anchoring and reconciliation.
//!
//! Registration runs canonicalize → digest → append (pending) → anchor →
//! record anchor. The version is persisted before the ledger write, so a
//! ledger failure leaves a visible, reanchorable version instead of an
//! orphaned ledger record.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use docseal_core::{
    now_millis, CanonicalizeError, Canonicalizer, Contract, ContractId, ContractVersion, Digest,
    LedgerTxRef, NewContract, NewVersion, TenantId, VersionId,
};
use docseal_ledger::{AnchorRequest, Ledger, LedgerError};
use docseal_store::{StoreError, VersionStore};

use crate::config::PipelineConfig;
use crate::document::{canonicalize_bytes, DocumentUpload};
use crate::error::{PipelineError, Result};
use crate::verify::{VerificationEngine, VerificationRequest, VerificationResult};

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub contract_id: ContractId,
    pub version_id: VersionId,
    pub version_number: u64,
    pub version_label: String,
    #[serde(rename = "contractHash")]
    pub digest: Digest,
    #[serde(rename = "onChainTxHash")]
    pub ledger_tx: LedgerTxRef,
}

/// A version reconciliation could not anchor.
#[derive(Debug)]
pub struct ReconcileFailure {
    pub version_id: VersionId,
    pub version_number: u64,
    pub error: PipelineError,
}

/// Result of anchoring every pending version of a contract.
#[derive(Debug)]
pub struct ReconcileReport {
    pub contract_id: ContractId,
    pub anchored: Vec<(VersionId, LedgerTxRef)>,
    pub failed: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    /// Nothing is left unanchored.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The document integrity pipeline.
///
/// Holds no per-request state; clones share the store, ledger and
/// canonicalizer.
pub struct Pipeline<S: VersionStore, L: Ledger> {
    store: Arc<S>,
    ledger: Arc<L>,
    canonicalizer: Arc<Canonicalizer>,
    config: PipelineConfig,
}

impl<S: VersionStore, L: Ledger> Clone for Pipeline<S, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ledger: Arc::clone(&self.ledger),
            canonicalizer: Arc::clone(&self.canonicalizer),
            config: self.config.clone(),
        }
    }
}

impl<S: VersionStore, L: Ledger> Pipeline<S, L> {
    /// Create a pipeline with the built-in extractors.
    pub fn new(store: S, ledger: L, config: PipelineConfig) -> Result<Self> {
        Self::from_shared(Arc::new(store), Arc::new(ledger), config)
    }

    /// Create a pipeline over a store and ledger shared with other owners.
    pub fn from_shared(store: Arc<S>, ledger: Arc<L>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            ledger,
            canonicalizer: Arc::new(Canonicalizer::new()),
            config,
        })
    }

    /// Replace the extractor registry.
    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = Arc::new(canonicalizer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A verification engine sharing this pipeline's components.
    pub fn verifier(&self) -> VerificationEngine<S, L> {
        VerificationEngine::new(
            Arc::clone(&self.store),
            Arc::clone(&self.ledger),
            Arc::clone(&self.canonicalizer),
            self.config.hash_algorithm,
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a document as a new version and anchor it.
    ///
    /// Nothing is persisted if canonicalization fails. If the ledger write
    /// fails or times out, the version stays persisted without a ledger
    /// reference and [`PipelineError::Unanchored`] is returned.
    pub async fn register(&self, upload: DocumentUpload) -> Result<Registration> {
        let file_type = upload.file_type;
        let document = canonicalize_bytes(&self.canonicalizer, upload.bytes, file_type).await?;
        if document.is_empty() {
            return Err(
                CanonicalizeError::extraction(file_type.as_str(), "document has no text content")
                    .into(),
            );
        }

        let contract = match upload.contract_id {
            Some(id) => self
                .store
                .get_contract(&id)
                .await?
                .ok_or(PipelineError::ContractNotFound(id))?,
            None => {
                let created = self
                    .store
                    .create_contract(NewContract::new(
                        upload.file_name.clone(),
                        upload.tenant,
                        now_millis(),
                    ))
                    .await?;
                info!(contract = %created.id, name = %created.name, "contract created");
                created
            }
        };

        let pending = NewVersion::from_canonical(
            contract.id,
            upload.file_name,
            file_type,
            document.raw_text,
            document.canonical_text,
            self.config.hash_algorithm,
            now_millis(),
        );
        let version = self.append_with_retry(pending).await?;
        info!(
            contract = %version.contract_id,
            version = version.version_number,
            digest = %version.digest,
            "version persisted, anchoring"
        );

        let tx = match self.anchor(&version).await {
            Ok(tx) => tx,
            Err(source) => {
                warn!(
                    contract = %version.contract_id,
                    version = version.version_number,
                    error = %source,
                    "version left unanchored"
                );
                return Err(PipelineError::Unanchored {
                    version: Box::new(version),
                    source,
                });
            }
        };

        let anchored = self.store.record_anchor(&version.id, &tx).await?;
        info!(
            contract = %anchored.contract_id,
            version = anchored.version_number,
            tx = %tx,
            "version anchored"
        );

        Ok(Registration {
            contract_id: anchored.contract_id,
            version_id: anchored.id,
            version_number: anchored.version_number,
            version_label: anchored.label().to_string(),
            digest: anchored.digest,
            ledger_tx: tx,
        })
    }

    async fn append_with_retry(&self, pending: NewVersion) -> Result<ContractVersion> {
        match self.store.append(pending.clone()).await {
            Err(StoreError::VersionConflict {
                contract_id,
                version_number,
            }) if self.config.retry_version_conflict => {
                debug!(
                    contract = %contract_id,
                    version = version_number,
                    "version number taken by a concurrent writer, retrying"
                );
                Ok(self.store.append(pending).await?)
            }
            other => Ok(other?),
        }
    }

    /// One ledger write, bounded by `anchor_timeout`.
    async fn anchor(
        &self,
        version: &ContractVersion,
    ) -> std::result::Result<LedgerTxRef, LedgerError> {
        let request = AnchorRequest {
            contract_id: version.contract_id,
            version_label: version.label().to_string(),
            canonical_text: version.canonical_text.clone(),
            normalization_version: version.normalization_version.clone(),
            hash_algorithm: version.hash_algorithm,
        };

        let write = self.ledger.register(&request);
        match tokio::time::timeout(self.config.anchor_timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(self.config.anchor_timeout)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────

    /// Anchor a version that was persisted without a ledger reference.
    ///
    /// Returns the existing reference if the version is already anchored.
    /// Fails with [`PipelineError::DigestDrift`] if the stored text no longer
    /// reproduces the stored digest.
    pub async fn reanchor(&self, version_id: &VersionId) -> Result<LedgerTxRef> {
        let version = self.store.get_version(version_id).await?;
        if let Some(tx) = &version.ledger_tx {
            debug!(version = %version_id, "already anchored");
            return Ok(tx.clone());
        }

        self.ensure_consistent(&version)?;

        let tx = self.anchor(&version).await?;
        self.store.record_anchor(&version.id, &tx).await?;
        info!(
            contract = %version.contract_id,
            version = version.version_number,
            tx = %tx,
            "version reanchored"
        );
        Ok(tx)
    }

    /// Reanchor every pending version of a contract, oldest first.
    pub async fn reconcile(&self, contract_id: &ContractId) -> Result<ReconcileReport> {
        if self.store.get_contract(contract_id).await?.is_none() {
            return Err(PipelineError::ContractNotFound(*contract_id));
        }

        let mut report = ReconcileReport {
            contract_id: *contract_id,
            anchored: Vec::new(),
            failed: Vec::new(),
        };

        for version in self.store.list_unanchored(contract_id).await? {
            match self.reanchor(&version.id).await {
                Ok(tx) => report.anchored.push((version.id, tx)),
                Err(error) => {
                    warn!(
                        contract = %contract_id,
                        version = version.version_number,
                        error = %error,
                        "reconciliation failed for version"
                    );
                    report.failed.push(ReconcileFailure {
                        version_id: version.id,
                        version_number: version.version_number,
                        error,
                    });
                }
            }
        }

        info!(
            contract = %contract_id,
            anchored = report.anchored.len(),
            failed = report.failed.len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Whether the stored canonical text still reproduces the stored digest.
    pub async fn audit_version(&self, version_id: &VersionId) -> Result<bool> {
        let version = self.store.get_version(version_id).await?;
        Ok(version.digest_is_consistent())
    }

    fn ensure_consistent(&self, version: &ContractVersion) -> Result<()> {
        let recomputed = version.recompute_digest();
        if recomputed != version.digest {
            return Err(PipelineError::DigestDrift {
                version_id: version.id,
                stored: version.digest,
                recomputed,
            });
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn contract(&self, contract_id: &ContractId) -> Result<Contract> {
        self.store
            .get_contract(contract_id)
            .await?
            .ok_or(PipelineError::ContractNotFound(*contract_id))
    }

    /// A tenant's contracts, newest first.
    pub async fn contracts(&self, tenant: &TenantId) -> Result<Vec<Contract>> {
        Ok(self.store.list_contracts(tenant).await?)
    }

    /// A contract's versions, newest first.
    pub async fn versions(&self, contract_id: &ContractId) -> Result<Vec<ContractVersion>> {
        if self.store.get_contract(contract_id).await?.is_none() {
            return Err(PipelineError::ContractNotFound(*contract_id));
        }
        Ok(self.store.list_versions(contract_id).await?)
    }

    pub async fn version(&self, version_id: &VersionId) -> Result<ContractVersion> {
        Ok(self.store.get_version(version_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Check a document against the ledger.
    pub async fn verify(&self, request: VerificationRequest) -> Result<VerificationResult> {
        self.verifier().verify(request).await
    }
}
