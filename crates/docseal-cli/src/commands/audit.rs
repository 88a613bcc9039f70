//! Audit command implementation. Reads the database only.

use std::process::ExitCode;

use anyhow::bail;
use serde_json::json;

use docseal::store::VersionStore;

use super::{parse_contract_id, Context, EXIT_DRIFT};
use crate::output::print_json;

pub async fn run(ctx: &Context, contract: &str, json_output: bool) -> anyhow::Result<ExitCode> {
    let contract_id = parse_contract_id(contract)?;
    let store = ctx.open_store()?;
    if store.get_contract(&contract_id).await?.is_none() {
        bail!("contract {} not found", contract_id);
    }

    let mut drifted = 0usize;
    let mut rows = Vec::new();
    for version in store.list_versions(&contract_id).await? {
        let recomputed = version.recompute_digest();
        let consistent = recomputed == version.digest;
        if !consistent {
            drifted += 1;
        }

        if json_output {
            rows.push(json!({
                "versionId": version.id.to_string(),
                "versionLabel": version.label().to_string(),
                "contractHash": version.digest,
                "recomputedHash": recomputed,
                "consistent": consistent,
            }));
        } else {
            let mark = if consistent { "ok" } else { "DRIFT" };
            println!("{:<6}  {:<5}  {}", version.label().to_string(), mark, version.digest);
        }
    }

    if json_output {
        print_json(&rows)?;
    }
    if drifted > 0 {
        eprintln!("{} version(s) no longer reproduce their stored digest", drifted);
        return Ok(ExitCode::from(EXIT_DRIFT));
    }
    Ok(ExitCode::SUCCESS)
}
