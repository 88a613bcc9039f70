//! Strong type definitions for DocSeal.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CanonicalizeError;

/// Identifier of a contract lineage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub Uuid);

impl ContractId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the hyphenated string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ContractId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.0)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContractId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifier of a single registered version.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub Uuid);

impl VersionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the hyphenated string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionId({})", self.0)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VersionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Opaque reference to the owning tenant (organization).
///
/// Membership and access checks live outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boundary label of a version: `v<N>` with N >= 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct VersionLabel(u64);

impl VersionLabel {
    /// `v1`, the first version of every contract.
    pub const MIN: Self = Self(1);

    /// Create a label for a version number. Returns `None` for 0.
    pub const fn new(number: u64) -> Option<Self> {
        if number == 0 {
            None
        } else {
            Some(Self(number))
        }
    }

    /// The version number this label names.
    pub const fn number(&self) -> u64 {
        self.0
    }

    /// Parse `v3`, `V3` or a bare `3`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('v')
            .or_else(|| s.strip_prefix('V'))
            .unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u64>().ok().and_then(Self::new)
    }
}

impl TryFrom<u64> for VersionLabel {
    type Error = String;

    fn try_from(number: u64) -> std::result::Result<Self, Self::Error> {
        Self::new(number).ok_or_else(|| "version numbers start at 1".to_string())
    }
}

impl From<VersionLabel> for u64 {
    fn from(label: VersionLabel) -> u64 {
        label.0
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Declared document type. Fixed enumeration; extraction is keyed on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Pdf, FileType::Docx, FileType::Txt];

    /// Persisted tag (`pdf`, `docx`, `txt`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
            FileType::Txt => "txt",
        }
    }

    /// Resolve a declared type given as an extension or a MIME type.
    pub fn from_declared(declared: &str) -> Result<Self, CanonicalizeError> {
        let normalized = declared.trim().trim_start_matches('.').to_ascii_lowercase();
        let mime = normalized.split(';').next().unwrap_or("").trim();
        match mime {
            "pdf" | "application/pdf" => Ok(FileType::Pdf),
            "docx"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(FileType::Docx)
            }
            "txt" | "text/plain" => Ok(FileType::Txt),
            _ => Err(CanonicalizeError::UnsupportedFormat(declared.to_string())),
        }
    }

    /// Infer the type from a file name's extension.
    pub fn from_file_name(name: &str) -> Result<Self, CanonicalizeError> {
        match name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => Self::from_declared(ext)
                .map_err(|_| CanonicalizeError::UnsupportedFormat(name.to_string())),
            _ => Err(CanonicalizeError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Resolve from an optional MIME type, falling back to the file name.
    pub fn detect(mime: Option<&str>, file_name: &str) -> Result<Self, CanonicalizeError> {
        mime.and_then(|m| Self::from_declared(m).ok())
            .map(Ok)
            .unwrap_or_else(|| Self::from_file_name(file_name))
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = CanonicalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_declared(s)
    }
}
