//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::Path;

use docseal::{
    DocumentUpload, Pipeline, PipelineConfig, Registration, VerificationRequest,
    VerificationResult,
};
use docseal_core::{ContractId, FileType, TenantId};
use docseal_ledger::MemoryLedger;
use docseal_store::{MemoryStore, SqliteStore};

/// Tenant used by fixtures unless one is given.
pub const DEFAULT_TENANT: &str = "tenant-test";

/// A pipeline over an in-memory store and ledger.
pub struct TestFixture {
    pub pipeline: Pipeline<MemoryStore, MemoryLedger>,
    pub tenant: TenantId,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline::new(MemoryStore::new(), MemoryLedger::new(), config)
                .expect("fixture config must be valid"),
            tenant: TenantId::new(DEFAULT_TENANT),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.pipeline.store()
    }

    pub fn ledger(&self) -> &MemoryLedger {
        self.pipeline.ledger()
    }

    /// An upload for a new contract in this fixture's tenant.
    pub fn upload(
        &self,
        file_name: &str,
        file_type: FileType,
        bytes: impl Into<bytes::Bytes>,
    ) -> DocumentUpload {
        DocumentUpload::new(self.tenant.clone(), file_name, file_type, bytes)
    }

    /// Register plain text as a new contract.
    pub async fn register_text(&self, file_name: &str, text: &str) -> docseal::Result<Registration> {
        self.pipeline
            .register(self.upload(file_name, FileType::Txt, text.to_owned()))
            .await
    }

    /// Register plain text as the next version of `contract_id`.
    pub async fn register_revision(
        &self,
        contract_id: ContractId,
        text: &str,
    ) -> docseal::Result<Registration> {
        let upload = self
            .upload("revision.txt", FileType::Txt, text.to_owned())
            .for_contract(contract_id);
        self.pipeline.register(upload).await
    }

    /// Verify plain text, panicking on pipeline errors.
    pub async fn verify_text(
        &self,
        contract_id: ContractId,
        label: Option<&str>,
        text: &str,
    ) -> VerificationResult {
        let mut request = VerificationRequest::latest(contract_id, FileType::Txt, text.to_owned());
        if let Some(label) = label {
            request = request.at_label(label);
        }
        self.pipeline
            .verify(request)
            .await
            .expect("verification should reach a status")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A pipeline over a SQLite file in `dir` and an in-memory ledger.
pub fn sqlite_pipeline(dir: &Path) -> Pipeline<SqliteStore, MemoryLedger> {
    let store = SqliteStore::open(dir.join("docseal.db")).expect("open sqlite store");
    Pipeline::new(store, MemoryLedger::new(), PipelineConfig::default())
        .expect("default config must be valid")
}
