//! Output formatting utilities.

use serde::Serialize;

use docseal::core::{Contract, ContractVersion, Digest, HashAlgorithm, LedgerTxRef};

/// Version metadata without document text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub contract_id: String,
    pub version_id: String,
    pub version_number: u64,
    pub version_label: String,
    pub file_name: String,
    #[serde(rename = "contractHash")]
    pub digest: Digest,
    pub hash_algorithm: HashAlgorithm,
    pub normalization_version: String,
    #[serde(rename = "onChainTxHash")]
    pub ledger_tx: Option<LedgerTxRef>,
    pub created_at: i64,
}

impl From<&ContractVersion> for VersionSummary {
    fn from(v: &ContractVersion) -> Self {
        Self {
            contract_id: v.contract_id.to_string(),
            version_id: v.id.to_string(),
            version_number: v.version_number,
            version_label: v.label().to_string(),
            file_name: v.file_name.clone(),
            digest: v.digest,
            hash_algorithm: v.hash_algorithm,
            normalization_version: v.normalization_version.clone(),
            ledger_tx: v.ledger_tx.clone(),
            created_at: v.created_at,
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[allow(clippy::print_literal)]
pub fn print_contract_header() {
    println!("{:<36}  {:<13}  {}", "CONTRACT_ID", "CREATED_AT", "NAME");
    println!("{}", "-".repeat(80));
}

pub fn print_contract_row(contract: &Contract) {
    println!(
        "{:<36}  {:<13}  {}",
        contract.id.to_string(),
        contract.created_at,
        contract.name
    );
}

#[allow(clippy::print_literal)]
pub fn print_version_header() {
    println!("{:<6}  {:<36}  {:<16}  {}", "LABEL", "VERSION_ID", "DIGEST", "ANCHOR");
    println!("{}", "-".repeat(100));
}

pub fn print_version_row(version: &ContractVersion) {
    println!(
        "{:<6}  {:<36}  {:<16}  {}",
        version.label().to_string(),
        version.id.to_string(),
        truncate(&version.digest.to_hex(), 16),
        version
            .ledger_tx
            .as_ref()
            .map(LedgerTxRef::as_str)
            .unwrap_or("(unanchored)")
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
