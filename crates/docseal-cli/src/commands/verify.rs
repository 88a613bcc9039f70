//! Verify command implementation.

use std::path::Path;
use std::process::ExitCode;

use docseal::{VerificationRequest, UNKNOWN_VERSION};

use super::{parse_contract_id, read_document, Context, EXIT_NOT_VERIFIED};
use crate::output::print_json;

pub async fn run(
    ctx: &Context,
    contract: &str,
    file: &Path,
    label: Option<String>,
    declared: Option<&str>,
    strict: bool,
    json_output: bool,
) -> anyhow::Result<ExitCode> {
    let contract_id = parse_contract_id(contract)?;
    let document = read_document(file, declared)?;
    let pipeline = ctx.pipeline()?;

    let mut request = VerificationRequest::latest(contract_id, document.file_type, document.bytes);
    if let Some(label) = label {
        request = request.at_label(label);
    }
    let result = pipeline.verify(request).await?;

    if json_output {
        print_json(&result)?;
    } else {
        println!("status     {}", result.status);
        println!(
            "version    {} ({})",
            result.version_label.as_deref().unwrap_or(UNKNOWN_VERSION),
            result.version_id
        );
        println!("submitted  {}", result.submitted_digest);
        match &result.anchored_digest {
            Some(digest) => println!("anchored   {}", digest),
            None => println!("anchored   (none)"),
        }
        if let Some(details) = &result.details {
            println!("details    {}", details);
        }
    }

    if strict && !result.is_verified() {
        return Ok(ExitCode::from(EXIT_NOT_VERIFIED));
    }
    Ok(ExitCode::SUCCESS)
}
