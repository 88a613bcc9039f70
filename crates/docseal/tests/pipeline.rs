//! End-to-end pipeline behavior over the in-memory and SQLite stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use docseal::core::{
    compute_digest, CanonicalizeError, Contract, ContractId, ContractVersion, FileType,
    HashAlgorithm, LedgerTxRef, NewContract, NewVersion, TenantId, VersionId,
};
use docseal::ledger::{Ledger, LedgerError, MemoryLedger, WriteFault};
use docseal::store::{MemoryStore, SqliteStore, StoreError, VersionStore};
use docseal::{
    DocumentUpload, Pipeline, PipelineConfig, PipelineError, VerificationRequest,
    VerificationStatus, UNKNOWN_VERSION,
};

const HELLO_WORLD_KECCAK: &str = "592fa743889fc7f92ac2a37bb1f5ba1daf2a5c84741ca0e0061d243a2e6707ba";
const HELLO_LOWER_KECCAK: &str = "ed6c11b0b5b808960df26f5bfc471d04c1995b0ffd2055925ad1be28d6baadfd";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("docseal=debug")
        .try_init();
}

fn tenant() -> TenantId {
    TenantId::new("acme")
}

fn upload(text: &str) -> DocumentUpload {
    DocumentUpload::new(tenant(), "nda.txt", FileType::Txt, text.to_string())
}

fn memory_pipeline() -> Pipeline<MemoryStore, MemoryLedger> {
    init_tracing();
    Pipeline::new(MemoryStore::new(), MemoryLedger::new(), PipelineConfig::default()).unwrap()
}

fn verify_latest(contract_id: ContractId, text: &str) -> VerificationRequest {
    VerificationRequest::latest(contract_id, FileType::Txt, text.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration and verification
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_then_verify_identical_document() {
    let pipeline = memory_pipeline();

    let reg = pipeline.register(upload("Hello World")).await.unwrap();
    assert_eq!(reg.version_number, 1);
    assert_eq!(reg.version_label, "v1");
    assert_eq!(reg.digest.to_hex(), HELLO_WORLD_KECCAK);
    assert_eq!(pipeline.ledger().write_count(), 1);

    let stored = pipeline.version(&reg.version_id).await.unwrap();
    assert_eq!(stored.ledger_tx, Some(reg.ledger_tx.clone()));
    assert_eq!(stored.hash_algorithm.tag(), "Keccak-256");
    assert_eq!(stored.normalization_version, "1.0");

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello World"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(result.submitted_digest.to_hex(), HELLO_WORLD_KECCAK);
    assert_eq!(result.anchored_digest, Some(reg.digest));
    assert_eq!(result.version_id, reg.version_id.to_string());
    assert_eq!(result.version_label.as_deref(), Some("v1"));
    assert!(result.details.is_none());
}

#[tokio::test]
async fn test_whitespace_variants_verify() {
    let pipeline = memory_pipeline();
    let reg = pipeline.register(upload("Hello World")).await.unwrap();

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "  Hello \t  World\r\n\r\n\r\n"))
        .await
        .unwrap();
    assert!(result.is_verified());
}

#[tokio::test]
async fn test_single_character_tamper_is_mismatch() {
    let pipeline = memory_pipeline();
    let reg = pipeline.register(upload("Hello World")).await.unwrap();

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello world"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::VersionMismatch);
    assert_eq!(result.submitted_digest.to_hex(), HELLO_LOWER_KECCAK);
    assert_eq!(
        result.anchored_digest.map(|d| d.to_hex()).as_deref(),
        Some(HELLO_WORLD_KECCAK)
    );
    assert!(result.details.unwrap().contains("v1"));
}

#[tokio::test]
async fn test_versions_are_numbered_in_order() {
    let pipeline = memory_pipeline();
    let first = pipeline.register(upload("draft one")).await.unwrap();
    for text in ["draft two", "draft three"] {
        pipeline
            .register(upload(text).for_contract(first.contract_id))
            .await
            .unwrap();
    }

    let versions = pipeline.versions(&first.contract_id).await.unwrap();
    let numbers: Vec<u64> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
    assert!(versions.iter().all(|v| v.is_anchored()));

    // Latest is checked by default; earlier labels on request.
    let latest = pipeline
        .verify(verify_latest(first.contract_id, "draft three"))
        .await
        .unwrap();
    assert!(latest.is_verified());
    assert_eq!(latest.version_label.as_deref(), Some("v3"));

    let old = pipeline
        .verify(verify_latest(first.contract_id, "draft one").at_label("v1"))
        .await
        .unwrap();
    assert!(old.is_verified());
    assert_eq!(old.version_id, first.version_id.to_string());
}

#[tokio::test]
async fn test_concurrent_uploads_get_distinct_numbers() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::from_shared(
        Arc::clone(&store),
        Arc::new(MemoryLedger::new()),
        PipelineConfig::default(),
    )
    .unwrap();
    let contract = store
        .create_contract(NewContract::new("msa.txt", tenant(), 0))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..3 {
        let pipeline = pipeline.clone();
        let id = contract.id;
        handles.push(tokio::spawn(async move {
            pipeline
                .register(upload(&format!("revision {}", i)).for_contract(id))
                .await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().unwrap().version_number);
    }
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_concurrent_uploads_on_sqlite() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("docseal.db")).unwrap());
    let pipeline = Pipeline::from_shared(
        Arc::clone(&store),
        Arc::new(MemoryLedger::new()),
        PipelineConfig::default(),
    )
    .unwrap();
    let contract = store
        .create_contract(NewContract::new("msa.txt", tenant(), 0))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..5 {
        let pipeline = pipeline.clone();
        let id = contract.id;
        handles.push(tokio::spawn(async move {
            pipeline
                .register(upload(&format!("clause {}", i)).for_contract(id))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let numbers: Vec<u64> = pipeline
        .versions(&contract.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.version_number)
        .collect();
    assert_eq!(numbers, vec![5, 4, 3, 2, 1]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Verification outcomes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_contract_without_versions_is_not_found() {
    let pipeline = memory_pipeline();
    let contract = pipeline
        .store()
        .create_contract(NewContract::new("empty.txt", tenant(), 0))
        .await
        .unwrap();

    let result = pipeline
        .verify(verify_latest(contract.id, "Hello World"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::NotFound);
    assert_eq!(result.version_id, UNKNOWN_VERSION);
    assert_eq!(result.submitted_digest.to_hex(), HELLO_WORLD_KECCAK);
    assert!(result.anchored_digest.is_none());
}

#[tokio::test]
async fn test_unknown_contract_is_not_found() {
    let pipeline = memory_pipeline();
    let result = pipeline
        .verify(verify_latest(ContractId::new(), "Hello World"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::NotFound);
}

#[tokio::test]
async fn test_unanchored_label_is_not_verified() {
    let pipeline = memory_pipeline();
    let reg = pipeline.register(upload("Hello World")).await.unwrap();

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello World").at_label("v5"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::NotVerified);
    assert_eq!(result.version_id, UNKNOWN_VERSION);
    assert_eq!(result.version_label.as_deref(), Some("v5"));
    assert!(result.anchored_digest.is_none());
}

#[tokio::test]
async fn test_label_is_sent_to_ledger_verbatim() {
    let pipeline = memory_pipeline();
    let reg = pipeline.register(upload("Hello World")).await.unwrap();

    // "1" resolves locally to v1, but the ledger key is "1", which was never anchored.
    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello World").at_label("1"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::NotVerified);
    assert_eq!(result.version_id, reg.version_id.to_string());
}

#[tokio::test]
async fn test_ledger_read_failure_is_not_verified() {
    let pipeline = memory_pipeline();
    let reg = pipeline.register(upload("Hello World")).await.unwrap();
    pipeline.ledger().set_fail_reads(true).await;

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello World"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::NotVerified);
    assert!(result.details.unwrap().contains("ledger read failed"));
}

#[tokio::test]
async fn test_zero_digest_on_ledger_is_a_record() {
    let pipeline = memory_pipeline();
    let contract = pipeline
        .store()
        .create_contract(NewContract::new("z.txt", tenant(), 0))
        .await
        .unwrap();
    pipeline
        .ledger()
        .insert_record(&contract.id, "v9", docseal::Digest::ZERO)
        .await;

    let result = pipeline
        .verify(verify_latest(contract.id, "Hello World").at_label("v9"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::VersionMismatch);
    assert_eq!(result.anchored_digest, Some(docseal::Digest::ZERO));
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure handling
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_document_is_rejected_without_side_effects() {
    let pipeline = memory_pipeline();
    let err = pipeline.register(upload(" \n\t \u{a0}\n")).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Canonicalize(CanonicalizeError::Extraction { .. })
    ));
    assert!(err.is_client_error());
    assert!(err.to_string().contains("no text content"));
    assert!(pipeline.contracts(&tenant()).await.unwrap().is_empty());
    assert_eq!(pipeline.ledger().write_count(), 0);
}

#[tokio::test]
async fn test_invalid_utf8_is_extraction_error() {
    let pipeline = memory_pipeline();
    let bad = DocumentUpload::new(tenant(), "bad.txt", FileType::Txt, vec![0xff, 0xfe, 0x00]);
    let err = pipeline.register(bad).await.unwrap_err();
    assert!(err.is_client_error());
    assert!(pipeline.contracts(&tenant()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_target_contract() {
    let pipeline = memory_pipeline();
    let missing = ContractId::new();
    let err = pipeline
        .register(upload("text").for_contract(missing))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ContractNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_ledger_outage_leaves_unanchored_version_then_reanchor() {
    let pipeline = memory_pipeline();
    pipeline.ledger().fail_next_write(WriteFault::Unavailable).await;

    let err = pipeline.register(upload("Hello World")).await.unwrap_err();
    assert!(err.is_retryable());
    let pending = err.unanchored_version().unwrap().clone();
    assert_eq!(pending.version_number, 1);
    assert!(!pending.is_anchored());

    // Persisted, reported, and not yet verifiable.
    let stored = pipeline.version(&pending.id).await.unwrap();
    assert!(stored.ledger_tx.is_none());
    let result = pipeline
        .verify(verify_latest(pending.contract_id, "Hello World"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::NotVerified);

    let tx = pipeline.reanchor(&pending.id).await.unwrap();
    assert_eq!(pipeline.version(&pending.id).await.unwrap().ledger_tx, Some(tx.clone()));

    // Reanchoring an anchored version is a no-op.
    assert_eq!(pipeline.reanchor(&pending.id).await.unwrap(), tx);
    assert_eq!(pipeline.ledger().write_count(), 1);

    let result = pipeline
        .verify(verify_latest(pending.contract_id, "Hello World"))
        .await
        .unwrap();
    assert!(result.is_verified());
}

#[tokio::test]
async fn test_rejected_write_is_not_retryable() {
    let pipeline = memory_pipeline();
    pipeline.ledger().fail_next_write(WriteFault::Rejected).await;

    let err = pipeline.register(upload("Hello World")).await.unwrap_err();
    assert!(matches!(
        &err,
        PipelineError::Unanchored { source: LedgerError::Rejected(_), .. }
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_anchor_timeout_leaves_version_unanchored() {
    init_tracing();
    let config = PipelineConfig {
        anchor_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let pipeline = Pipeline::new(MemoryStore::new(), MemoryLedger::new(), config).unwrap();
    pipeline
        .ledger()
        .set_write_delay(Some(Duration::from_secs(30)))
        .await;

    let err = pipeline.register(upload("slow ledger")).await.unwrap_err();
    assert!(matches!(
        &err,
        PipelineError::Unanchored { source: LedgerError::Timeout(_), .. }
    ));
    let pending = err.unanchored_version().unwrap().clone();

    // The write landed after we stopped waiting: verification succeeds, but
    // the local row still has no reference and the ledger refuses a rewrite.
    let result = pipeline
        .verify(verify_latest(pending.contract_id, "slow ledger"))
        .await
        .unwrap();
    assert!(result.is_verified());

    pipeline.ledger().set_write_delay(None).await;
    let err = pipeline.reanchor(&pending.id).await.unwrap_err();
    assert!(matches!(err, PipelineError::Ledger(LedgerError::Rejected(_))));
    assert!(!pipeline.version(&pending.id).await.unwrap().is_anchored());
}

#[tokio::test]
async fn test_reconcile_anchors_pending_versions() {
    let pipeline = memory_pipeline();
    let first = pipeline.register(upload("one")).await.unwrap();
    let contract_id = first.contract_id;

    for text in ["two", "three"] {
        pipeline.ledger().fail_next_write(WriteFault::Unavailable).await;
        let err = pipeline
            .register(upload(text).for_contract(contract_id))
            .await
            .unwrap_err();
        assert!(err.unanchored_version().is_some());
    }
    assert_eq!(pipeline.store().list_unanchored(&contract_id).await.unwrap().len(), 2);

    let report = pipeline.reconcile(&contract_id).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.anchored.len(), 2);
    assert!(pipeline.store().list_unanchored(&contract_id).await.unwrap().is_empty());

    let err = pipeline.reconcile(&ContractId::new()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ContractNotFound(_)));
}

#[tokio::test]
async fn test_reconcile_collects_failures() {
    let pipeline = memory_pipeline();
    pipeline.ledger().fail_next_write(WriteFault::Unavailable).await;
    let err = pipeline.register(upload("one")).await.unwrap_err();
    let pending = err.unanchored_version().unwrap().clone();

    pipeline.ledger().fail_next_write(WriteFault::Unavailable).await;
    let report = pipeline.reconcile(&pending.contract_id).await.unwrap();
    assert!(!report.is_complete());
    assert_eq!(report.failed[0].version_id, pending.id);
    assert!(report.failed[0].error.is_retryable());
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stored_canonical_text_reproduces_digest() {
    let pipeline = memory_pipeline();
    let reg = pipeline
        .register(upload("Line one  \r\n\r\n\r\n\r\n  Line two"))
        .await
        .unwrap();

    let stored = pipeline.version(&reg.version_id).await.unwrap();
    assert_eq!(stored.canonical_text, "Line one\n\nLine two");
    assert_eq!(stored.raw_text, "Line one  \r\n\r\n\r\n\r\n  Line two");
    assert!(pipeline.audit_version(&reg.version_id).await.unwrap());
}

/// Store that hands back versions whose canonical text was altered after
/// the digest was taken.
struct DriftingStore(MemoryStore);

#[async_trait]
impl VersionStore for DriftingStore {
    async fn create_contract(&self, c: NewContract) -> Result<Contract, StoreError> {
        self.0.create_contract(c).await
    }
    async fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>, StoreError> {
        self.0.get_contract(id).await
    }
    async fn list_contracts(&self, t: &TenantId) -> Result<Vec<Contract>, StoreError> {
        self.0.list_contracts(t).await
    }
    async fn next_version_number(&self, id: &ContractId) -> Result<u64, StoreError> {
        self.0.next_version_number(id).await
    }
    async fn append(&self, v: NewVersion) -> Result<ContractVersion, StoreError> {
        self.0.append(v).await
    }
    async fn list_versions(&self, id: &ContractId) -> Result<Vec<ContractVersion>, StoreError> {
        self.0.list_versions(id).await
    }
    async fn get_version(&self, id: &VersionId) -> Result<ContractVersion, StoreError> {
        let mut v = self.0.get_version(id).await?;
        v.canonical_text.push('!');
        Ok(v)
    }
    async fn get_version_by_number(
        &self,
        id: &ContractId,
        n: u64,
    ) -> Result<Option<ContractVersion>, StoreError> {
        self.0.get_version_by_number(id, n).await
    }
    async fn latest_version(&self, id: &ContractId) -> Result<Option<ContractVersion>, StoreError> {
        self.0.latest_version(id).await
    }
    async fn record_anchor(
        &self,
        id: &VersionId,
        tx: &LedgerTxRef,
    ) -> Result<ContractVersion, StoreError> {
        self.0.record_anchor(id, tx).await
    }
    async fn list_unanchored(&self, id: &ContractId) -> Result<Vec<ContractVersion>, StoreError> {
        self.0.list_unanchored(id).await
    }
}

#[tokio::test]
async fn test_reanchor_refuses_drifted_text() {
    init_tracing();
    let ledger = Arc::new(MemoryLedger::new());
    let pipeline = Pipeline::from_shared(
        Arc::new(DriftingStore(MemoryStore::new())),
        Arc::clone(&ledger),
        PipelineConfig::default(),
    )
    .unwrap();

    ledger.fail_next_write(WriteFault::Unavailable).await;
    let err = pipeline.register(upload("Hello World")).await.unwrap_err();
    let pending = err.unanchored_version().unwrap().clone();

    assert!(!pipeline.audit_version(&pending.id).await.unwrap());
    let err = pipeline.reanchor(&pending.id).await.unwrap_err();
    assert!(matches!(err, PipelineError::DigestDrift { .. }));
    assert_eq!(ledger.fetch(&pending.contract_id, "v1").await.unwrap(), None);
}

/// Store whose first `conflicts` appends lose the version number to a
/// concurrent writer.
struct ContendedStore {
    inner: MemoryStore,
    conflicts: AtomicUsize,
    appends: AtomicUsize,
}

impl ContendedStore {
    fn new(conflicts: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            conflicts: AtomicUsize::new(conflicts),
            appends: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VersionStore for ContendedStore {
    async fn create_contract(&self, c: NewContract) -> Result<Contract, StoreError> {
        self.inner.create_contract(c).await
    }
    async fn get_contract(&self, id: &ContractId) -> Result<Option<Contract>, StoreError> {
        self.inner.get_contract(id).await
    }
    async fn list_contracts(&self, t: &TenantId) -> Result<Vec<Contract>, StoreError> {
        self.inner.list_contracts(t).await
    }
    async fn next_version_number(&self, id: &ContractId) -> Result<u64, StoreError> {
        self.inner.next_version_number(id).await
    }
    async fn append(&self, v: NewVersion) -> Result<ContractVersion, StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        let lost = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lost {
            return Err(StoreError::VersionConflict {
                contract_id: v.contract_id,
                version_number: self.inner.next_version_number(&v.contract_id).await?,
            });
        }
        self.inner.append(v).await
    }
    async fn list_versions(&self, id: &ContractId) -> Result<Vec<ContractVersion>, StoreError> {
        self.inner.list_versions(id).await
    }
    async fn get_version(&self, id: &VersionId) -> Result<ContractVersion, StoreError> {
        self.inner.get_version(id).await
    }
    async fn get_version_by_number(
        &self,
        id: &ContractId,
        n: u64,
    ) -> Result<Option<ContractVersion>, StoreError> {
        self.inner.get_version_by_number(id, n).await
    }
    async fn latest_version(&self, id: &ContractId) -> Result<Option<ContractVersion>, StoreError> {
        self.inner.latest_version(id).await
    }
    async fn record_anchor(
        &self,
        id: &VersionId,
        tx: &LedgerTxRef,
    ) -> Result<ContractVersion, StoreError> {
        self.inner.record_anchor(id, tx).await
    }
    async fn list_unanchored(&self, id: &ContractId) -> Result<Vec<ContractVersion>, StoreError> {
        self.inner.list_unanchored(id).await
    }
}

fn contended_pipeline(
    conflicts: usize,
    config: PipelineConfig,
) -> (Arc<ContendedStore>, Pipeline<ContendedStore, MemoryLedger>) {
    init_tracing();
    let store = Arc::new(ContendedStore::new(conflicts));
    let pipeline =
        Pipeline::from_shared(Arc::clone(&store), Arc::new(MemoryLedger::new()), config).unwrap();
    (store, pipeline)
}

#[tokio::test]
async fn test_single_version_conflict_is_retried() {
    let (store, pipeline) = contended_pipeline(1, PipelineConfig::default());

    let reg = pipeline.register(upload("Hello World")).await.unwrap();
    assert_eq!(reg.version_number, 1);
    assert_eq!(store.appends.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.versions(&reg.contract_id).await.unwrap().len(), 1);

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello World"))
        .await
        .unwrap();
    assert!(result.is_verified());
}

#[tokio::test]
async fn test_repeated_version_conflict_surfaces() {
    let (store, pipeline) = contended_pipeline(2, PipelineConfig::default());

    let err = pipeline.register(upload("Hello World")).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Store(StoreError::VersionConflict { version_number: 1, .. })
    ));
    assert_eq!(store.appends.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.ledger().write_count(), 0);
}

#[tokio::test]
async fn test_version_conflict_without_retry_surfaces() {
    let config = PipelineConfig {
        retry_version_conflict: false,
        ..PipelineConfig::default()
    };
    let (store, pipeline) = contended_pipeline(1, config);

    let err = pipeline.register(upload("Hello World")).await.unwrap_err();
    assert!(matches!(err, PipelineError::Store(StoreError::VersionConflict { .. })));
    assert_eq!(store.appends.load(Ordering::SeqCst), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Hash algorithms
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_uses_algorithm_recorded_on_version() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(MemoryLedger::new());
    let sha_config = PipelineConfig {
        hash_algorithm: HashAlgorithm::Sha256,
        ..PipelineConfig::default()
    };
    let sha = Pipeline::from_shared(Arc::clone(&store), Arc::clone(&ledger), sha_config).unwrap();
    let keccak = Pipeline::from_shared(store, ledger, PipelineConfig::default()).unwrap();

    let reg = sha.register(upload("Hello World")).await.unwrap();
    let expected = compute_digest("Hello World", HashAlgorithm::Sha256);
    assert_eq!(reg.digest, expected);

    let result = keccak
        .verify(verify_latest(reg.contract_id, "Hello World"))
        .await
        .unwrap();
    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(result.submitted_digest, expected);

    let by_label = keccak
        .verify(verify_latest(reg.contract_id, "Hello World").at_label("v1"))
        .await
        .unwrap();
    assert!(by_label.is_verified());

    let tampered = keccak
        .verify(verify_latest(reg.contract_id, "Hello world"))
        .await
        .unwrap();
    assert_eq!(tampered.status, VerificationStatus::VersionMismatch);
    assert_eq!(
        tampered.submitted_digest,
        compute_digest("Hello world", HashAlgorithm::Sha256)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_registration_and_result_json() {
    let pipeline = memory_pipeline();
    let reg = pipeline.register(upload("Hello World")).await.unwrap();
    let json = serde_json::to_value(&reg).unwrap();
    assert_eq!(json["contractHash"], HELLO_WORLD_KECCAK);
    assert_eq!(json["versionNumber"], 1);
    assert!(json["onChainTxHash"].as_str().unwrap().starts_with("0x"));

    let result = pipeline
        .verify(verify_latest(reg.contract_id, "Hello World"))
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "VERIFIED");
    assert_eq!(json["submittedHash"], json["onChainHash"]);
    assert_eq!(json["contractId"], reg.contract_id.to_string());
}
