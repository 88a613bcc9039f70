//! Register command implementation.

use std::path::Path;
use std::process::ExitCode;

use docseal::{DocumentUpload, PipelineError};

use super::{parse_contract_id, read_document, Context, EXIT_UNANCHORED};
use crate::output::{print_json, VersionSummary};

pub async fn run(
    ctx: &Context,
    file: &Path,
    contract: Option<&str>,
    declared: Option<&str>,
    json_output: bool,
) -> anyhow::Result<ExitCode> {
    let document = read_document(file, declared)?;
    let pipeline = ctx.pipeline()?;

    let mut upload = DocumentUpload::new(
        ctx.config.tenant()?,
        document.file_name,
        document.file_type,
        document.bytes,
    );
    if let Some(id) = contract {
        upload = upload.for_contract(parse_contract_id(id)?);
    }

    match pipeline.register(upload).await {
        Ok(registration) => {
            if json_output {
                print_json(&registration)?;
            } else {
                println!("contract  {}", registration.contract_id);
                println!("version   {} ({})", registration.version_label, registration.version_id);
                println!("digest    {}", registration.digest);
                println!("anchor    {}", registration.ledger_tx);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(PipelineError::Unanchored { version, source }) => {
            eprintln!(
                "Warning: {} of contract {} was stored but not anchored: {}",
                version.label(),
                version.contract_id,
                source
            );
            eprintln!("Run `docseal reanchor {}` once the ledger is reachable.", version.id);
            if json_output {
                print_json(&VersionSummary::from(version.as_ref()))?;
            } else {
                println!("contract  {}", version.contract_id);
                println!("version   {} ({})", version.label(), version.id);
                println!("digest    {}", version.digest);
                println!("anchor    (unanchored)");
            }
            Ok(ExitCode::from(EXIT_UNANCHORED))
        }
        Err(err) => Err(err.into()),
    }
}
