//! Subcommand implementations.

use std::path::Path;

use anyhow::Context as _;
use tracing::debug;

use docseal::core::{ContractId, FileType, VersionId};
use docseal::ledger::RpcLedger;
use docseal::store::SqliteStore;
use docseal::Pipeline;

use crate::config::CliConfig;

pub mod audit;
pub mod canonicalize;
pub mod digest;
pub mod list;
pub mod reanchor;
pub mod register;
pub mod verify;

/// Version stored, ledger write failed.
pub const EXIT_UNANCHORED: u8 = 2;
/// `--strict` verification did not end in `VERIFIED`.
pub const EXIT_NOT_VERIFIED: u8 = 3;
/// A stored digest no longer matches its stored canonical text.
pub const EXIT_DRIFT: u8 = 4;

/// Resolved configuration shared by subcommands.
pub struct Context {
    pub config: CliConfig,
}

impl Context {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        debug!(path = %self.config.database.display(), "opening database");
        SqliteStore::open(&self.config.database)
            .with_context(|| format!("opening database {}", self.config.database.display()))
    }

    /// A pipeline over the configured database and JSON-RPC ledger.
    pub fn pipeline(&self) -> anyhow::Result<Pipeline<SqliteStore, RpcLedger>> {
        let ledger = RpcLedger::new(self.config.rpc_config()).context("configuring ledger")?;
        let store = self.open_store()?;
        Ok(Pipeline::new(store, ledger, self.config.pipeline_config())?)
    }
}

/// A document read from disk.
pub struct LoadedDocument {
    pub file_name: String,
    pub file_type: FileType,
    pub bytes: Vec<u8>,
}

/// Read a document, taking its type from `declared` or the extension.
pub fn read_document(path: &Path, declared: Option<&str>) -> anyhow::Result<LoadedDocument> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file_type = FileType::detect(declared, &file_name)?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(LoadedDocument {
        file_name,
        file_type,
        bytes,
    })
}

pub fn parse_contract_id(s: &str) -> anyhow::Result<ContractId> {
    ContractId::parse(s).with_context(|| format!("invalid contract id {:?}", s))
}

pub fn parse_version_id(s: &str) -> anyhow::Result<VersionId> {
    VersionId::parse(s).with_context(|| format!("invalid version id {:?}", s))
}
