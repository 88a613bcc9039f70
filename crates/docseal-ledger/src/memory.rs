//! In-memory ledger for tests.
//!
//! Behaves like the on-chain registry: it hashes the submitted content with
//! the requested algorithm, refuses duplicate keys, and hands out
//! transaction references. Faults can be injected to exercise the
//! unanchored paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use docseal_core::{compute_digest, ContractId, Digest, LedgerTxRef};

use crate::error::{LedgerError, Result};
use crate::traits::{AnchorRequest, Ledger};

/// A fault applied to the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// Fail as if the node were unreachable. Nothing is recorded.
    Unavailable,
    /// Fail as if the transaction reverted. Nothing is recorded.
    Rejected,
}

/// One anchored binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub digest: Digest,
    pub tx: LedgerTxRef,
    pub normalization_version: String,
    pub hash_algorithm: String,
}

#[derive(Default)]
struct MemoryLedgerInner {
    records: HashMap<(String, String), LedgerRecord>,
    next_fault: Option<WriteFault>,
    fail_reads: bool,
    write_delay: Option<Duration>,
}

/// In-memory ledger implementation.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
    writes: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `register` call fail with `fault`.
    pub async fn fail_next_write(&self, fault: WriteFault) {
        self.inner.write().await.next_fault = Some(fault);
    }

    /// Make every `fetch` fail as unavailable until turned off.
    pub async fn set_fail_reads(&self, fail: bool) {
        self.inner.write().await.fail_reads = fail;
    }

    /// Delay confirmation of writes. The record lands before the delay, so a
    /// caller that gives up early still leaves an anchored key behind.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.inner.write().await.write_delay = delay;
    }

    /// Bind a digest directly, bypassing content hashing.
    pub async fn insert_record(&self, contract_id: &ContractId, version_label: &str, digest: Digest) {
        let tx = self.next_tx();
        self.inner.write().await.records.insert(
            (contract_id.to_string(), version_label.to_string()),
            LedgerRecord {
                digest,
                tx,
                normalization_version: docseal_core::NORMALIZATION_VERSION.to_string(),
                hash_algorithm: docseal_core::HashAlgorithm::default().tag().to_string(),
            },
        );
    }

    /// The record for a key, if any.
    pub async fn record(&self, contract_id: &ContractId, version_label: &str) -> Option<LedgerRecord> {
        self.inner
            .read()
            .await
            .records
            .get(&(contract_id.to_string(), version_label.to_string()))
            .cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn next_tx(&self) -> LedgerTxRef {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        LedgerTxRef::new(format!("0x{:064x}", n))
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn register(&self, request: &AnchorRequest) -> Result<LedgerTxRef> {
        let (tx, delay) = {
            let mut inner = self.inner.write().await;

            match inner.next_fault.take() {
                Some(WriteFault::Unavailable) => {
                    return Err(LedgerError::Unavailable("injected fault".into()))
                }
                Some(WriteFault::Rejected) => {
                    return Err(LedgerError::Rejected("injected fault".into()))
                }
                None => {}
            }

            let key = request.key();
            if inner.records.contains_key(&key) {
                return Err(LedgerError::Rejected(format!(
                    "record already exists for {}/{}",
                    key.0, key.1
                )));
            }

            let tx = self.next_tx();
            inner.records.insert(
                key,
                LedgerRecord {
                    digest: compute_digest(&request.canonical_text, request.hash_algorithm),
                    tx: tx.clone(),
                    normalization_version: request.normalization_version.clone(),
                    hash_algorithm: request.hash_algorithm.tag().to_string(),
                },
            );
            (tx, inner.write_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        tracing::debug!(tx = %tx, "memory ledger write confirmed");
        Ok(tx)
    }

    async fn fetch(&self, contract_id: &ContractId, version_label: &str) -> Result<Option<Digest>> {
        let inner = self.inner.read().await;
        if inner.fail_reads {
            return Err(LedgerError::Unavailable("injected read fault".into()));
        }
        Ok(inner
            .records
            .get(&(contract_id.to_string(), version_label.to_string()))
            .map(|r| r.digest))
    }
}
