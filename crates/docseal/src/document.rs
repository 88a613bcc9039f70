//! Uploaded documents and the shared canonicalization step.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use docseal_core::{CanonicalDocument, Canonicalizer, ContractId, ExtractorDeterminism, FileType, TenantId};

use crate::error::{PipelineError, Result};

/// A document submitted for registration.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Existing contract to add a version to. `None` creates a new contract
    /// named after the file.
    pub contract_id: Option<ContractId>,
    pub tenant: TenantId,
    pub file_name: String,
    pub file_type: FileType,
    pub bytes: Bytes,
}

impl DocumentUpload {
    /// Upload for a new contract.
    pub fn new(
        tenant: TenantId,
        file_name: impl Into<String>,
        file_type: FileType,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            contract_id: None,
            tenant,
            file_name: file_name.into(),
            file_type,
            bytes: bytes.into(),
        }
    }

    /// Target an existing contract instead.
    pub fn for_contract(mut self, contract_id: ContractId) -> Self {
        self.contract_id = Some(contract_id);
        self
    }
}

/// Canonicalize bytes off the async runtime when parsing is involved.
pub(crate) async fn canonicalize_bytes(
    canonicalizer: &Arc<Canonicalizer>,
    bytes: Bytes,
    file_type: FileType,
) -> Result<CanonicalDocument> {
    let document = match file_type {
        FileType::Txt => canonicalizer.canonicalize_document(&bytes, file_type)?,
        FileType::Pdf | FileType::Docx => {
            let canonicalizer = Arc::clone(canonicalizer);
            tokio::task::spawn_blocking(move || {
                canonicalizer.canonicalize_document(&bytes, file_type)
            })
            .await
            .map_err(|e| PipelineError::Task(format!("spawn_blocking failed: {}", e)))??
        }
    };

    if document.determinism == ExtractorDeterminism::LibraryDependent {
        warn!(
            file_type = %file_type,
            "canonical text depends on the extraction library version"
        );
    }
    Ok(document)
}
