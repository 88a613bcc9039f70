//! Minimal Ethereum ABI encoding for the registry contract.
//!
//! Only what the registry needs: calls whose arguments are all `string`,
//! the `(bytes32, bool)` return of `getRecord`, and `Error(string)` revert
//! payloads.

use docseal_core::Digest;
use sha3::{Digest as _, Keccak256};

use crate::error::{LedgerError, Result};

/// `registerContract(contractId, versionId, content, normalizationVersion, hashAlgorithm)`.
pub const REGISTER_SIGNATURE: &str = "registerContract(string,string,string,string,string)";

/// `getRecord(contractId, versionId) returns (bytes32 hash, bool exists)`.
pub const GET_RECORD_SIGNATURE: &str = "getRecord(string,string)";

/// Solidity's standard revert payload.
pub const ERROR_SIGNATURE: &str = "Error(string)";

const WORD: usize = 32;

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

fn push_word(out: &mut Vec<u8>, value: usize) {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    out.extend_from_slice(&word);
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Encode a call whose arguments are all dynamic `string`s.
pub fn encode_string_call(signature: &str, args: &[&str]) -> Vec<u8> {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();
    let head_len = args.len() * WORD;

    for arg in args {
        push_word(&mut head, head_len + tail.len());
        let bytes = arg.as_bytes();
        push_word(&mut tail, bytes.len());
        tail.extend_from_slice(bytes);
        tail.resize(tail.len() + padded_len(bytes.len()) - bytes.len(), 0);
    }

    let mut out = Vec::with_capacity(4 + head.len() + tail.len());
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    out
}

fn read_word(data: &[u8], index: usize) -> Result<&[u8]> {
    data.get(index * WORD..(index + 1) * WORD)
        .ok_or_else(|| {
            LedgerError::InvalidResponse(format!("return data too short: {} bytes", data.len()))
        })
}

fn word_to_usize(word: &[u8]) -> Result<usize> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(LedgerError::InvalidResponse("integer out of range".into()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(buf))
        .map_err(|_| LedgerError::InvalidResponse("integer out of range".into()))
}

/// Decode `(bytes32 hash, bool exists)`. `None` when `exists` is false.
pub fn decode_record(data: &[u8]) -> Result<Option<Digest>> {
    let hash = read_word(data, 0)?;
    let exists = read_word(data, 1)?;

    match word_to_usize(exists)? {
        0 => Ok(None),
        1 => {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(hash);
            Ok(Some(Digest::from_bytes(bytes)))
        }
        other => Err(LedgerError::InvalidResponse(format!("invalid bool word: {}", other))),
    }
}

/// Extract the message from an `Error(string)` revert payload.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&selector(ERROR_SIGNATURE)[..])?;
    let offset = word_to_usize(read_word(body, 0).ok()?).ok()?;
    let start = offset.checked_add(WORD)?;
    let len = word_to_usize(body.get(offset..start)?).ok()?;
    let end = start.checked_add(len)?;
    let bytes = body.get(start..end)?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// `0x`-prefixed lowercase hex, the JSON-RPC data encoding.
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse JSON-RPC hex data, with or without the `0x` prefix.
pub fn from_hex_data(s: &str) -> Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| LedgerError::InvalidResponse(format!("bad hex data: {}", e)))
}
