//! List command implementation. Reads the database only.

use std::process::ExitCode;

use anyhow::bail;

use docseal::store::VersionStore;

use super::{parse_contract_id, Context};
use crate::output::{
    print_contract_header, print_contract_row, print_json, print_version_header,
    print_version_row, VersionSummary,
};

pub async fn contracts(ctx: &Context, json_output: bool) -> anyhow::Result<ExitCode> {
    let store = ctx.open_store()?;
    let contracts = store.list_contracts(&ctx.config.tenant()?).await?;

    if json_output {
        print_json(&contracts)?;
    } else {
        print_contract_header();
        for contract in &contracts {
            print_contract_row(contract);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn versions(ctx: &Context, contract: &str, json_output: bool) -> anyhow::Result<ExitCode> {
    let contract_id = parse_contract_id(contract)?;
    let store = ctx.open_store()?;
    if store.get_contract(&contract_id).await?.is_none() {
        bail!("contract {} not found", contract_id);
    }
    let versions = store.list_versions(&contract_id).await?;

    if json_output {
        let summaries: Vec<VersionSummary> = versions.iter().map(VersionSummary::from).collect();
        print_json(&summaries)?;
    } else {
        print_version_header();
        for version in &versions {
            print_version_row(version);
        }
    }
    Ok(ExitCode::SUCCESS)
}
