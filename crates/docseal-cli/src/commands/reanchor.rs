//! Reanchor and reconcile command implementations.

use std::process::ExitCode;

use serde_json::json;

use super::{parse_contract_id, parse_version_id, Context, EXIT_UNANCHORED};
use crate::output::print_json;

pub async fn run(ctx: &Context, version: &str) -> anyhow::Result<ExitCode> {
    let version_id = parse_version_id(version)?;
    let pipeline = ctx.pipeline()?;
    let tx = pipeline.reanchor(&version_id).await?;
    println!("{}", tx);
    Ok(ExitCode::SUCCESS)
}

pub async fn reconcile(ctx: &Context, contract: &str, json_output: bool) -> anyhow::Result<ExitCode> {
    let contract_id = parse_contract_id(contract)?;
    let pipeline = ctx.pipeline()?;
    let report = pipeline.reconcile(&contract_id).await?;

    if json_output {
        let anchored: Vec<_> = report
            .anchored
            .iter()
            .map(|(id, tx)| json!({ "versionId": id.to_string(), "onChainTxHash": tx }))
            .collect();
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|f| {
                json!({
                    "versionId": f.version_id.to_string(),
                    "versionNumber": f.version_number,
                    "error": f.error.to_string(),
                })
            })
            .collect();
        print_json(&json!({
            "contractId": contract_id.to_string(),
            "anchored": anchored,
            "failed": failed,
        }))?;
    } else {
        for (id, tx) in &report.anchored {
            println!("anchored  {}  {}", id, tx);
        }
        for failure in &report.failed {
            println!("failed    {}  v{}: {}", failure.version_id, failure.version_number, failure.error);
        }
        if report.anchored.is_empty() && report.failed.is_empty() {
            println!("nothing to anchor");
        }
    }

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_UNANCHORED))
    }
}
