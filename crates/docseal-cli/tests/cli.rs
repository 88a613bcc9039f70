//! Integration tests for CLI commands.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Nothing listens here; connections are refused immediately.
const DEAD_RPC_URL: &str = "http://127.0.0.1:1";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("docseal.db")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Run with a configured but unreachable ledger.
    fn run(&self, args: &[&str]) -> (i32, String, String) {
        self.run_with(args, |cmd| {
            cmd.env("DOCSEAL_RPC_URL", DEAD_RPC_URL)
                .env("DOCSEAL_CONTRACT_ADDRESS", "0x00000000000000000000000000000000000000aa")
                .env("DOCSEAL_FROM_ADDRESS", "0x00000000000000000000000000000000000000bb");
        })
    }

    fn run_with(&self, args: &[&str], configure: impl FnOnce(&mut Command)) -> (i32, String, String) {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_docseal"));
        for key in [
            "DOCSEAL_CONFIG",
            "DOCSEAL_DB",
            "DOCSEAL_TENANT",
            "DOCSEAL_RPC_URL",
            "DOCSEAL_CONTRACT_ADDRESS",
            "DOCSEAL_FROM_ADDRESS",
        ] {
            cmd.env_remove(key);
        }
        cmd.env("RUST_LOG", "warn").env("DOCSEAL_DB", self.db());
        configure(&mut cmd);

        let output = cmd.args(args).output().expect("failed to execute CLI");
        (
            output.status.code().unwrap_or(-1),
            String::from_utf8(output.stdout).unwrap(),
            String::from_utf8(output.stderr).unwrap(),
        )
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_canonicalize_prints_exact_text() {
    let ws = Workspace::new();
    let file = ws.write("nda.txt", "  Section 1.\r\n\r\n\r\n\r\nTerms\t\tapply.  ");

    let (code, stdout, _) = ws.run(&["canonicalize", path_arg(&file)]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "Section 1.\n\nTerms apply.");
}

#[test]
fn test_digest_vectors() {
    let ws = Workspace::new();
    let file = ws.write("hello.txt", "Hello World\n");

    let (code, stdout, _) = ws.run(&["digest", path_arg(&file)]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout.trim(),
        "592fa743889fc7f92ac2a37bb1f5ba1daf2a5c84741ca0e0061d243a2e6707ba"
    );

    let (code, stdout, _) = ws.run(&["digest", path_arg(&file), "--algorithm", "sha256", "--json"]);
    assert_eq!(code, 0);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        json["contractHash"],
        "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
    );
    assert_eq!(json["hashAlgorithm"], "SHA-256");
    assert_eq!(json["normalizationVersion"], "1.0");
}

#[test]
fn test_unsupported_type_fails() {
    let ws = Workspace::new();
    let file = ws.write("scan.png", "not text");

    let (code, _, stderr) = ws.run(&["digest", path_arg(&file)]);
    assert_eq!(code, 1);
    assert!(stderr.contains("scan.png"), "stderr: {}", stderr);
}

#[test]
fn test_register_requires_ledger_configuration() {
    let ws = Workspace::new();
    let file = ws.write("nda.txt", "Hello World");

    let (code, _, stderr) = ws.run_with(&["register", path_arg(&file)], |_| {});
    assert_eq!(code, 1);
    assert!(stderr.contains("contract_address"), "stderr: {}", stderr);

    let (code, stdout, _) = ws.run(&["list", "contracts", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(serde_json::from_str::<Value>(&stdout).unwrap(), Value::Array(vec![]));
}

#[test]
fn test_register_with_ledger_down_keeps_unanchored_version() {
    let ws = Workspace::new();
    let file = ws.write("lease.txt", "Rent is 100 per month.");

    let (code, stdout, stderr) = ws.run(&["register", path_arg(&file), "--json"]);
    assert_eq!(code, 2, "stderr: {}", stderr);
    assert!(stderr.contains("not anchored"));
    let registered: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(registered["versionNumber"], 1);
    assert_eq!(registered["versionLabel"], "v1");
    assert!(registered["onChainTxHash"].is_null());
    let contract_id = registered["contractId"].as_str().unwrap().to_string();

    // A second version goes to the same contract.
    let revised = ws.write("lease-v2.txt", "Rent is 120 per month.");
    let (code, stdout, _) = ws.run(&[
        "register",
        path_arg(&revised),
        "--contract",
        &contract_id,
        "--json",
    ]);
    assert_eq!(code, 2);
    let second: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(second["versionNumber"], 2);

    let (code, stdout, _) = ws.run(&["list", "versions", &contract_id, "--json"]);
    assert_eq!(code, 0);
    let versions: Value = serde_json::from_str(&stdout).unwrap();
    let labels: Vec<&str> = versions
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["versionLabel"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["v2", "v1"]);

    let (code, _, _) = ws.run(&["audit", &contract_id]);
    assert_eq!(code, 0);

    // The ledger cannot be read either: NOT_VERIFIED, not an error.
    let (code, stdout, _) = ws.run(&["verify", &contract_id, path_arg(&revised), "--json"]);
    assert_eq!(code, 0);
    let result: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["status"], "NOT_VERIFIED");
    assert_eq!(result["versionLabel"], "v2");

    let (code, _, _) = ws.run(&["verify", &contract_id, path_arg(&revised), "--strict"]);
    assert_eq!(code, 3);

    let (code, stdout, _) = ws.run(&["reconcile", &contract_id, "--json"]);
    assert_eq!(code, 2);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["failed"].as_array().unwrap().len(), 2);
}

#[test]
fn test_verify_unknown_contract_is_not_found() {
    let ws = Workspace::new();
    let file = ws.write("nda.txt", "Hello World");

    let (code, stdout, _) = ws.run(&[
        "verify",
        "7f1c2a9e-5b1d-4c3e-9a8f-2d6b0e4c1a77",
        path_arg(&file),
        "--json",
    ]);
    assert_eq!(code, 0);
    let result: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["status"], "NOT_FOUND");
    assert_eq!(result["versionId"], "unknown");
}

#[test]
fn test_invalid_contract_id_rejected() {
    let ws = Workspace::new();
    let (code, _, stderr) = ws.run(&["list", "versions", "not-a-uuid"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid contract id"));
}

#[test]
fn test_config_file_sets_tenant() {
    let ws = Workspace::new();
    let config = ws.write("docseal.toml", "tenant = \"globex\"\n");
    let file = ws.write("nda.txt", "Hello World");

    let (code, _, _) = ws.run(&["--config", path_arg(&config), "register", path_arg(&file)]);
    assert_eq!(code, 2);

    let (_, stdout, _) = ws.run(&["list", "contracts", "--json"]);
    assert_eq!(serde_json::from_str::<Value>(&stdout).unwrap(), Value::Array(vec![]));

    let (_, stdout, _) = ws.run(&["--config", path_arg(&config), "list", "contracts", "--json"]);
    let contracts: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(contracts[0]["tenant"], "globex");
    assert_eq!(contracts[0]["name"], "nda.txt");
}
