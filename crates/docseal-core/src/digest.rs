//! Content digests of canonical text.
//!
//! The pipeline keeps a local copy of the digest for fast lookups, but the
//! ledger's own digest is authoritative. Both sides must use the same
//! algorithm; [`HashAlgorithm::Keccak256`] is the default because the
//! on-chain registry hashes with it.

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest as _, Keccak256};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

use crate::error::DigestError;

/// Hash algorithms a digest may be computed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "Keccak-256")]
    Keccak256,
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "BLAKE3")]
    Blake3,
}

impl HashAlgorithm {
    /// Tag persisted alongside every version and sent to the ledger.
    pub const fn tag(&self) -> &'static str {
        match self {
            HashAlgorithm::Keccak256 => "Keccak-256",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Blake3 => "BLAKE3",
        }
    }

    /// Parse a persisted tag. Case and separators are ignored.
    pub fn from_tag(tag: &str) -> Result<Self, DigestError> {
        let folded: String = tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "keccak256" => Ok(HashAlgorithm::Keccak256),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            _ => Err(DigestError::UnsupportedAlgorithm(tag.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for HashAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// A 32-byte content digest.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex. Accepts an optional `0x` prefix and either case.
    pub fn from_hex(s: &str) -> Result<Self, DigestError> {
        let trimmed = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes =
            hex::decode(trimmed).map_err(|e| DigestError::InvalidEncoding(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DigestError::InvalidEncoding(format!("expected 32 bytes: {}", s)))?;
        Ok(Self(arr))
    }

    /// All-zero digest. A valid value, not an "absent" marker.
    pub const ZERO: Self = Self([0u8; 32]);
}

impl PartialEq for Digest {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Digest {}

impl std::hash::Hash for Digest {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.to_hex()
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Compute the digest of canonical text under `algorithm`.
///
/// Hashes the UTF-8 bytes of `canonical_text` with no framing.
pub fn compute_digest(canonical_text: &str, algorithm: HashAlgorithm) -> Digest {
    let data = canonical_text.as_bytes();
    let mut bytes = [0u8; 32];
    match algorithm {
        HashAlgorithm::Keccak256 => bytes.copy_from_slice(&Keccak256::digest(data)),
        HashAlgorithm::Sha256 => bytes.copy_from_slice(&Sha256::digest(data)),
        HashAlgorithm::Blake3 => bytes = *blake3::hash(data).as_bytes(),
    }
    Digest(bytes)
}

/// Tag-based entry point: `digest(canonicalText, algorithm) -> hex`.
pub fn digest_hex(canonical_text: &str, algorithm_tag: &str) -> Result<String, DigestError> {
    let algorithm = HashAlgorithm::from_tag(algorithm_tag)?;
    Ok(compute_digest(canonical_text, algorithm).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_hello_world() {
        let d = compute_digest("Hello World", HashAlgorithm::Keccak256);
        assert_eq!(
            d.to_hex(),
            "592fa743889fc7f92ac2a37bb1f5ba1daf2a5c84741ca0e0061d243a2e6707ba"
        );
    }

    #[test]
    fn test_keccak_empty() {
        let d = compute_digest("", HashAlgorithm::Keccak256);
        assert_eq!(
            d.to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_sha256_hello_world() {
        let d = compute_digest("Hello World", HashAlgorithm::Sha256);
        assert_eq!(
            d.to_hex(),
            "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
        );
    }

    #[test]
    fn test_blake3_empty() {
        let d = compute_digest("", HashAlgorithm::Blake3);
        assert_eq!(
            d.to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_algorithms_disagree() {
        let k = compute_digest("Hello World", HashAlgorithm::Keccak256);
        let s = compute_digest("Hello World", HashAlgorithm::Sha256);
        assert_ne!(k, s);
    }

    #[test]
    fn test_digest_hex_by_tag() {
        let hex = digest_hex("Hello World", "SHA-256").unwrap();
        assert!(hex.starts_with("a591a6d4"));
        assert!(matches!(
            digest_hex("Hello World", "MD5"),
            Err(DigestError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_from_tag_is_lenient_on_case() {
        assert_eq!(HashAlgorithm::from_tag("keccak256").unwrap(), HashAlgorithm::Keccak256);
        assert_eq!(HashAlgorithm::from_tag("sha-256").unwrap(), HashAlgorithm::Sha256);
        assert_eq!(HashAlgorithm::from_tag("Blake3").unwrap(), HashAlgorithm::Blake3);
    }

    #[test]
    fn test_from_hex_accepts_prefix() {
        let d = compute_digest("abc", HashAlgorithm::Keccak256);
        let prefixed = format!("0x{}", d.to_hex().to_uppercase());
        assert_eq!(Digest::from_hex(&prefixed).unwrap(), d);
        assert!(Digest::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let d = compute_digest("abc", HashAlgorithm::Keccak256);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(
            json,
            "\"4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45\""
        );
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
