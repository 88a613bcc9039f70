//! Pipeline configuration.

use std::time::Duration;

use docseal_core::{HashAlgorithm, NORMALIZATION_VERSION};

use crate::error::{PipelineError, Result};

/// Configuration for the [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Algorithm for local digests. Must match what the ledger computes.
    pub hash_algorithm: HashAlgorithm,
    /// Normalization scheme tag recorded with every version.
    pub normalization_version: String,
    /// Upper bound on a single ledger registration, confirmation included.
    pub anchor_timeout: Duration,
    /// Retry an append once when another writer took the version number.
    pub retry_version_conflict: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Keccak256,
            normalization_version: NORMALIZATION_VERSION.to_string(),
            anchor_timeout: Duration::from_secs(180),
            retry_version_conflict: true,
        }
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.normalization_version != NORMALIZATION_VERSION {
            return Err(PipelineError::Config(format!(
                "unsupported normalization scheme {:?}; this build implements {:?}",
                self.normalization_version, NORMALIZATION_VERSION
            )));
        }
        if self.anchor_timeout.is_zero() {
            return Err(PipelineError::Config("anchor_timeout must be positive".into()));
        }
        Ok(())
    }
}
