//! CLI configuration: TOML file, then `DOCSEAL_*` environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

use docseal::core::{HashAlgorithm, TenantId, NORMALIZATION_VERSION};
use docseal::ledger::RpcLedgerConfig;
use docseal::PipelineConfig;

/// Environment variables read by [`CliConfig::apply_env`].
pub const ENV_DB: &str = "DOCSEAL_DB";
pub const ENV_TENANT: &str = "DOCSEAL_TENANT";
pub const ENV_RPC_URL: &str = "DOCSEAL_RPC_URL";
pub const ENV_CONTRACT_ADDRESS: &str = "DOCSEAL_CONTRACT_ADDRESS";
pub const ENV_FROM_ADDRESS: &str = "DOCSEAL_FROM_ADDRESS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Tenant new contracts are created under.
    pub tenant: String,
    pub pipeline: PipelineSection,
    pub ledger: LedgerSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub hash_algorithm: HashAlgorithm,
    pub normalization_version: String,
    pub anchor_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerSection {
    pub rpc_url: String,
    pub contract_address: String,
    pub from_address: String,
    pub request_timeout_secs: u64,
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("docseal.db"),
            tenant: "default".to_string(),
            pipeline: PipelineSection::default(),
            ledger: LedgerSection::default(),
        }
    }
}

impl Default for PipelineSection {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            hash_algorithm: defaults.hash_algorithm,
            normalization_version: NORMALIZATION_VERSION.to_string(),
            anchor_timeout_secs: defaults.anchor_timeout.as_secs(),
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        let defaults = RpcLedgerConfig::default();
        Self {
            rpc_url: defaults.rpc_url,
            contract_address: defaults.contract_address,
            from_address: defaults.from_address,
            request_timeout_secs: defaults.request_timeout.as_secs(),
            confirmation_timeout_secs: defaults.confirmation_timeout.as_secs(),
            poll_interval_ms: defaults.poll_interval.as_millis() as u64,
        }
    }
}

impl CliConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from environment variables.
    ///
    /// Takes a lookup function so tests need not touch the process
    /// environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(ENV_DB) {
            self.database = PathBuf::from(db);
        }
        if let Some(tenant) = lookup(ENV_TENANT) {
            self.tenant = tenant;
        }
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.ledger.rpc_url = url;
        }
        if let Some(address) = lookup(ENV_CONTRACT_ADDRESS) {
            self.ledger.contract_address = address;
        }
        if let Some(address) = lookup(ENV_FROM_ADDRESS) {
            self.ledger.from_address = address;
        }
    }

    pub fn tenant(&self) -> anyhow::Result<TenantId> {
        if self.tenant.trim().is_empty() {
            bail!("tenant must not be empty");
        }
        Ok(TenantId::new(self.tenant.clone()))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            hash_algorithm: self.pipeline.hash_algorithm,
            normalization_version: self.pipeline.normalization_version.clone(),
            anchor_timeout: Duration::from_secs(self.pipeline.anchor_timeout_secs),
            ..PipelineConfig::default()
        }
    }

    pub fn rpc_config(&self) -> RpcLedgerConfig {
        RpcLedgerConfig {
            rpc_url: self.ledger.rpc_url.clone(),
            contract_address: self.ledger.contract_address.clone(),
            from_address: self.ledger.from_address.clone(),
            request_timeout: Duration::from_secs(self.ledger.request_timeout_secs),
            confirmation_timeout: Duration::from_secs(self.ledger.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(self.ledger.poll_interval_ms),
        }
    }
}
