//! DocSeal CLI - register documents, anchor their digests, verify submissions.
//!
//! Exit codes: 0 success, 1 error, 2 version stored but not anchored,
//! 3 document not verified (`--strict`), 4 stored digest drift.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod logging;
mod output;

use commands::{audit, canonicalize, digest, list, reanchor, register, verify, Context};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "docseal", version)]
#[command(about = "Document registration, ledger anchoring and verification")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "DOCSEAL_CONFIG")]
    config: Option<PathBuf>,
    /// SQLite database (overrides configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a document as a new contract or a new version
    Register {
        /// Document file (pdf, docx or txt)
        file: PathBuf,
        /// Existing contract to add a version to
        #[arg(long)]
        contract: Option<String>,
        /// Declared type or MIME type (default: from the file extension)
        #[arg(long = "type")]
        file_type: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a document against a contract's anchored digest
    Verify {
        /// Contract ID
        contract: String,
        /// Document file
        file: PathBuf,
        /// Version label to check (default: latest)
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "type")]
        file_type: Option<String>,
        /// Exit with a non-zero code unless VERIFIED
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
    /// List contracts or versions
    List {
        #[command(subcommand)]
        what: ListCommand,
    },
    /// Retry anchoring one stored version
    Reanchor {
        /// Version ID
        version: String,
    },
    /// Anchor every unanchored version of a contract
    Reconcile {
        /// Contract ID
        contract: String,
        #[arg(long)]
        json: bool,
    },
    /// Recompute stored digests from stored canonical text
    Audit {
        /// Contract ID
        contract: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical text of a document
    Canonicalize {
        file: PathBuf,
        #[arg(long = "type")]
        file_type: Option<String>,
    },
    /// Print the digest of a document's canonical text
    Digest {
        file: PathBuf,
        #[arg(long = "type")]
        file_type: Option<String>,
        /// Keccak-256, SHA-256 or BLAKE3 (default: configured algorithm)
        #[arg(long)]
        algorithm: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    /// Contracts of the configured tenant, newest first
    Contracts {
        #[arg(long)]
        json: bool,
    },
    /// Versions of a contract, newest first
    Versions {
        contract: String,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database = db;
    }
    let ctx = Context::new(config);

    match cli.command {
        Commands::Register {
            file,
            contract,
            file_type,
            json,
        } => register::run(&ctx, &file, contract.as_deref(), file_type.as_deref(), json).await,
        Commands::Verify {
            contract,
            file,
            label,
            file_type,
            strict,
            json,
        } => {
            verify::run(
                &ctx,
                &contract,
                &file,
                label,
                file_type.as_deref(),
                strict,
                json,
            )
            .await
        }
        Commands::List { what } => match what {
            ListCommand::Contracts { json } => list::contracts(&ctx, json).await,
            ListCommand::Versions { contract, json } => list::versions(&ctx, &contract, json).await,
        },
        Commands::Reanchor { version } => reanchor::run(&ctx, &version).await,
        Commands::Reconcile { contract, json } => reanchor::reconcile(&ctx, &contract, json).await,
        Commands::Audit { contract, json } => audit::run(&ctx, &contract, json).await,
        Commands::Canonicalize { file, file_type } => canonicalize::run(&file, file_type.as_deref()),
        Commands::Digest {
            file,
            file_type,
            algorithm,
            json,
        } => digest::run(&ctx, &file, file_type.as_deref(), algorithm.as_deref(), json),
    }
}
