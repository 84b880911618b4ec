#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// Run the CLI against `api_url` with credentials kept in `store`.
pub fn run_cli(args: &[&str], store: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reauth"));
    cmd.args(args);
    cmd.env("REAUTH_STORE", store);
    cmd.env("REAUTH_API_URL", api_url);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(args: &[&str], store: &Path, api_url: &str) -> String {
    let output = run_cli(args, store, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str], store: &Path, api_url: &str) -> String {
    let output = run_cli(args, store, api_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// An unsigned JWT carrying `claims`.
pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// Write a credential pair the way the file store lays it out.
pub fn write_store(store: &Path, access: &str, refresh: &str) {
    let content = serde_json::json!({"access_token": access, "refresh_token": refresh});
    std::fs::write(store, content.to_string()).expect("Failed to write store");
}

pub fn read_store(store: &Path) -> Option<Value> {
    let content = std::fs::read(store).ok()?;
    serde_json::from_slice(&content).ok()
}
