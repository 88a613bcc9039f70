//! JSON-RPC ledger client for an EVM registry contract.
//!
//! Writes are sent with `eth_sendTransaction` from a node-managed account
//! and confirmed by polling `eth_getTransactionReceipt`. Reads use
//! `eth_call` against `getRecord`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use docseal_core::{ContractId, Digest, LedgerTxRef};

use crate::abi;
use crate::error::{LedgerError, Result};
use crate::traits::{AnchorRequest, Ledger};

/// Connection settings for [`RpcLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcLedgerConfig {
    /// JSON-RPC endpoint, e.g. `http://127.0.0.1:8545`.
    pub rpc_url: String,
    /// Address of the deployed registry contract.
    pub contract_address: String,
    /// Node-managed account that signs registrations.
    pub from_address: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Upper bound on waiting for a receipt after submission.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for RpcLedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: String::new(),
            from_address: String::new(),
            request_timeout: Duration::from_secs(10),
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl RpcLedgerConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("rpc_url", &self.rpc_url),
            ("contract_address", &self.contract_address),
            ("from_address", &self.from_address),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::Unavailable(format!("ledger {} is not configured", name)));
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    /// Reverts become rejections; anything else the node refuses is treated
    /// as the ledger being unusable right now.
    fn into_ledger_error(self) -> LedgerError {
        let reason = self
            .data
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|d| abi::from_hex_data(d).ok())
            .and_then(|d| abi::decode_revert_reason(&d));

        let reverted = reason.is_some() || self.message.to_ascii_lowercase().contains("revert");
        let detail = match reason {
            Some(r) => format!("{} ({})", self.message, r),
            None => format!("{} (code {})", self.message, self.code),
        };

        if reverted {
            LedgerError::Rejected(detail)
        } else {
            LedgerError::Unavailable(detail)
        }
    }
}

/// Ledger client speaking Ethereum JSON-RPC over HTTP.
pub struct RpcLedger {
    client: reqwest::Client,
    config: RpcLedgerConfig,
    next_id: AtomicU64,
}

impl RpcLedger {
    /// Build a client. Fails if the config is incomplete.
    pub fn new(config: RpcLedgerConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LedgerError::Unavailable(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RpcLedgerConfig {
        &self.config
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(method, id, "json-rpc request");

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(error) = body.error {
            debug!(method, id, code = error.code, message = %error.message, "json-rpc error");
            return Err(error.into_ledger_error());
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<Value> {
        loop {
            let receipt = self
                .call("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !receipt.is_null() {
                return Ok(receipt);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn register(&self, request: &AnchorRequest) -> Result<LedgerTxRef> {
        let (contract_key, label) = request.key();
        let data = abi::encode_string_call(
            abi::REGISTER_SIGNATURE,
            &[
                contract_key.as_str(),
                label.as_str(),
                request.canonical_text.as_str(),
                request.normalization_version.as_str(),
                request.hash_algorithm.tag(),
            ],
        );

        let result = self
            .call(
                "eth_sendTransaction",
                json!([{
                    "from": self.config.from_address,
                    "to": self.config.contract_address,
                    "data": abi::to_hex_data(&data),
                }]),
            )
            .await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| LedgerError::InvalidResponse("transaction hash is not a string".into()))?
            .to_string();
        info!(contract = %contract_key, label = %label, tx = %tx_hash, "ledger transaction sent");

        let receipt = tokio::time::timeout(
            self.config.confirmation_timeout,
            self.wait_for_receipt(&tx_hash),
        )
        .await
        .map_err(|_| {
            warn!(tx = %tx_hash, "ledger confirmation timed out");
            LedgerError::Timeout(self.config.confirmation_timeout)
        })??;

        match receipt.get("status").and_then(Value::as_str) {
            Some("0x1") => {
                info!(tx = %tx_hash, "ledger transaction confirmed");
                Ok(LedgerTxRef::new(tx_hash))
            }
            Some("0x0") => Err(LedgerError::Rejected(format!("transaction {} reverted", tx_hash))),
            other => Err(LedgerError::InvalidResponse(format!(
                "unexpected receipt status {:?} for {}",
                other, tx_hash
            ))),
        }
    }

    async fn fetch(&self, contract_id: &ContractId, version_label: &str) -> Result<Option<Digest>> {
        let contract_key = contract_id.to_string();
        let data = abi::encode_string_call(abi::GET_RECORD_SIGNATURE, &[contract_key.as_str(), version_label]);

        let result = self
            .call(
                "eth_call",
                json!([
                    {
                        "to": self.config.contract_address,
                        "data": abi::to_hex_data(&data),
                    },
                    "latest"
                ]),
            )
            .await?;
        let raw = result
            .as_str()
            .ok_or_else(|| LedgerError::InvalidResponse("call result is not a string".into()))?;

        abi::decode_record(&abi::from_hex_data(raw)?)
    }
}
