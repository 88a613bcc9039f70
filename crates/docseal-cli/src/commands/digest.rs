//! Digest command implementation.

use std::path::Path;
use std::process::ExitCode;

use serde_json::json;

use docseal::core::{compute_digest, Canonicalizer, HashAlgorithm, NORMALIZATION_VERSION};

use super::{read_document, Context};
use crate::output::print_json;

pub fn run(
    ctx: &Context,
    file: &Path,
    declared: Option<&str>,
    algorithm: Option<&str>,
    json_output: bool,
) -> anyhow::Result<ExitCode> {
    let algorithm = match algorithm {
        Some(tag) => HashAlgorithm::from_tag(tag)?,
        None => ctx.config.pipeline.hash_algorithm,
    };
    let document = read_document(file, declared)?;
    let canonical = Canonicalizer::new().canonicalize_document(&document.bytes, document.file_type)?;
    let digest = compute_digest(&canonical.canonical_text, algorithm);

    if json_output {
        print_json(&json!({
            "fileName": document.file_name,
            "fileType": document.file_type,
            "hashAlgorithm": algorithm,
            "normalizationVersion": NORMALIZATION_VERSION,
            "contractHash": digest,
        }))?;
    } else {
        println!("{}", digest);
    }
    Ok(ExitCode::SUCCESS)
}
