//! Format-specific text extraction.
//!
//! Each supported [`FileType`] has one [`TextExtractor`]. Extractors produce
//! raw text only; normalization happens afterwards in [`crate::canonical`].

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::CanonicalizeError;
use crate::types::FileType;

/// Upper bound on the decompressed size of a DOCX main document part.
pub const MAX_DOCX_XML_BYTES: u64 = 64 * 1024 * 1024;

/// How reproducible an extractor's output is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorDeterminism {
    /// Output depends only on input bytes.
    Stable,
    /// Output may change with the parsing library's version (layout
    /// reconstruction, run merging). Digests taken across library upgrades
    /// may disagree.
    LibraryDependent,
}

/// A strategy that turns document bytes into raw text.
pub trait TextExtractor: Send + Sync {
    /// The file type this extractor handles.
    fn file_type(&self) -> FileType;

    /// Extract raw text.
    fn extract(&self, bytes: &[u8]) -> Result<String, CanonicalizeError>;

    fn determinism(&self) -> ExtractorDeterminism {
        ExtractorDeterminism::LibraryDependent
    }
}

/// Plain text: strict UTF-8 decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn file_type(&self) -> FileType {
        FileType::Txt
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, CanonicalizeError> {
        // Lossy decoding would map distinct byte sequences to the same text.
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| CanonicalizeError::extraction("txt", format!("invalid UTF-8: {}", e)))
    }

    fn determinism(&self) -> ExtractorDeterminism {
        ExtractorDeterminism::Stable
    }
}

/// PDF text layer, all pages in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn file_type(&self) -> FileType {
        FileType::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, CanonicalizeError> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| CanonicalizeError::extraction("pdf", e.to_string()))?;

        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(CanonicalizeError::extraction("pdf", "document is encrypted"));
        }

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Ok(String::new());
        }

        doc.extract_text(&pages)
            .map_err(|e| CanonicalizeError::extraction("pdf", e.to_string()))
    }
}

/// DOCX paragraph text from `word/document.xml`.
///
/// Each paragraph is followed by a blank line. `w:tab` becomes a tab and
/// `w:br`/`w:cr` become newlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    fn read_document_xml(bytes: &[u8]) -> Result<String, CanonicalizeError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| CanonicalizeError::extraction("docx", e.to_string()))?;
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|e| CanonicalizeError::extraction("docx", format!("word/document.xml: {}", e)))?;

        let mut xml = String::new();
        entry
            .take(MAX_DOCX_XML_BYTES + 1)
            .read_to_string(&mut xml)
            .map_err(|e| CanonicalizeError::extraction("docx", e.to_string()))?;
        if xml.len() as u64 > MAX_DOCX_XML_BYTES {
            return Err(CanonicalizeError::extraction(
                "docx",
                "main document part exceeds size limit",
            ));
        }
        Ok(xml)
    }

    /// Collect paragraph text from WordprocessingML.
    pub fn paragraph_text(xml: &str) -> Result<String, CanonicalizeError> {
        let mut reader = Reader::from_str(xml);
        let mut out = String::new();
        let mut in_text = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| CanonicalizeError::extraction("docx", e.to_string()))?;
            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:t" => in_text = true,
                    b"w:tab" => out.push('\t'),
                    b"w:br" | b"w:cr" => out.push('\n'),
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:tab" => out.push('\t'),
                    b"w:br" | b"w:cr" => out.push('\n'),
                    b"w:p" => out.push_str("\n\n"),
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:p" => out.push_str("\n\n"),
                    _ => {}
                },
                Event::Text(t) if in_text => {
                    let text = t
                        .unescape()
                        .map_err(|e| CanonicalizeError::extraction("docx", e.to_string()))?;
                    out.push_str(&text);
                }
                Event::CData(t) if in_text => {
                    out.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(out)
    }
}

impl TextExtractor for DocxExtractor {
    fn file_type(&self) -> FileType {
        FileType::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, CanonicalizeError> {
        let xml = Self::read_document_xml(bytes)?;
        Self::paragraph_text(&xml)
    }
}
