//! Canonical text for deterministic hashing.
//!
//! Normalization scheme `1.0` applies these rules, in order:
//! 1. `\r\n` and lone `\r` become `\n`
//! 2. Runs of spaces and tabs collapse to one space (newlines untouched)
//! 3. Runs of three or more `\n` collapse to exactly two
//! 4. Every line is trimmed, then the whole text is trimmed
//!
//! Rule 3 runs before the per-line trim. Whitespace-only lines between
//! newlines therefore survive rule 3 and end up as empty lines after rule 4.
//! That quirk is part of the scheme: changing it changes every digest.
//!
//! The canonical string must be byte-identical across runs, platforms and
//! implementations, since the ledger digest depends on it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::CanonicalizeError;
use crate::extract::{
    DocxExtractor, ExtractorDeterminism, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use crate::types::FileType;

/// Tag of the normalization scheme implemented by [`normalize`].
pub const NORMALIZATION_VERSION: &str = "1.0";

/// Characters removed by line and document trimming.
///
/// Fixed explicitly rather than delegated to `char::is_whitespace`, which
/// differs from other platforms' trim (it includes U+0085 and excludes U+FEFF).
pub fn is_trim_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn trim(s: &str) -> &str {
    s.trim_matches(is_trim_whitespace)
}

/// Apply normalization scheme `1.0` to extracted text.
pub fn normalize(text: &str) -> String {
    // Rule 1: line endings.
    let mut unix = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            unix.push('\n');
        } else {
            unix.push(c);
        }
    }

    // Rule 2: horizontal whitespace runs.
    let mut collapsed = String::with_capacity(unix.len());
    let mut in_run = false;
    for c in unix.chars() {
        if c == ' ' || c == '\t' {
            if !in_run {
                collapsed.push(' ');
                in_run = true;
            }
        } else {
            collapsed.push(c);
            in_run = false;
        }
    }

    // Rule 3: blank line runs.
    let mut paragraphs = String::with_capacity(collapsed.len());
    let mut newlines = 0usize;
    for c in collapsed.chars() {
        if c == '\n' {
            newlines += 1;
            continue;
        }
        flush_newlines(&mut paragraphs, newlines);
        newlines = 0;
        paragraphs.push(c);
    }
    flush_newlines(&mut paragraphs, newlines);

    // Rule 4: per-line trim, then whole-text trim.
    let lines: Vec<&str> = paragraphs.split('\n').map(trim).collect();
    trim(&lines.join("\n")).to_string()
}

fn flush_newlines(out: &mut String, count: usize) {
    let emit = if count >= 3 { 2 } else { count };
    for _ in 0..emit {
        out.push('\n');
    }
}

/// Raw extracted text and its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDocument {
    pub file_type: FileType,
    pub raw_text: String,
    pub canonical_text: String,
    /// Whether extraction is reproducible across library versions.
    pub determinism: ExtractorDeterminism,
}

impl CanonicalDocument {
    pub fn is_empty(&self) -> bool {
        self.canonical_text.is_empty()
    }
}

/// Registry of format extractors plus the normalizer.
///
/// Extractors are pluggable per [`FileType`]; digest and ledger code never
/// depends on which extractor produced the text.
#[derive(Clone)]
pub struct Canonicalizer {
    extractors: BTreeMap<FileType, Arc<dyn TextExtractor>>,
}

impl Canonicalizer {
    /// A canonicalizer with the built-in pdf, docx and txt extractors.
    pub fn new() -> Self {
        Self::empty()
            .with_extractor(Arc::new(PdfExtractor))
            .with_extractor(Arc::new(DocxExtractor))
            .with_extractor(Arc::new(PlainTextExtractor))
    }

    /// A canonicalizer with no extractors registered.
    pub fn empty() -> Self {
        Self {
            extractors: BTreeMap::new(),
        }
    }

    /// Register (or replace) the extractor for its file type.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractors.insert(extractor.file_type(), extractor);
        self
    }

    /// File types this canonicalizer can handle.
    pub fn supported(&self) -> Vec<FileType> {
        self.extractors.keys().copied().collect()
    }

    /// Extract and normalize, keeping the raw text.
    pub fn canonicalize_document(
        &self,
        bytes: &[u8],
        file_type: FileType,
    ) -> Result<CanonicalDocument, CanonicalizeError> {
        let extractor = self
            .extractors
            .get(&file_type)
            .ok_or_else(|| CanonicalizeError::UnsupportedFormat(file_type.to_string()))?;

        let raw_text = extractor.extract(bytes)?;
        let canonical_text = normalize(&raw_text);

        Ok(CanonicalDocument {
            file_type,
            raw_text,
            canonical_text,
            determinism: extractor.determinism(),
        })
    }

    /// `canonicalize(bytes, declaredType) -> canonicalText`.
    ///
    /// `declared` may be an extension (`pdf`, `.docx`) or a MIME type.
    pub fn canonicalize(&self, bytes: &[u8], declared: &str) -> Result<String, CanonicalizeError> {
        let file_type = FileType::from_declared(declared)?;
        self.canonicalize_document(bytes, file_type)
            .map(|doc| doc.canonical_text)
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("supported", &self.supported())
            .finish()
    }
}
