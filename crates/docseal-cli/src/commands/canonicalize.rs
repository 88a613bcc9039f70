//! Canonicalize command implementation.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use docseal::core::Canonicalizer;

use super::read_document;

/// Write the canonical text to stdout exactly, without a trailing newline.
pub fn run(file: &Path, declared: Option<&str>) -> anyhow::Result<ExitCode> {
    let document = read_document(file, declared)?;
    let canonical = Canonicalizer::new().canonicalize_document(&document.bytes, document.file_type)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(canonical.canonical_text.as_bytes())?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}
