#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tokio::process::Command;
use wiremock::MockServer;

/// API URL for a mock server, with the version prefix the backend uses.
pub fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/api/v1", server.address().port())
}

/// Run the CLI binary against `api_url`, keeping the session in `data_dir`.
pub async fn run_cli(args: &[&str], data_dir: &Path, api_url: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pillbox"))
        .args(args)
        .env("PILLBOX_DATA_DIR", data_dir)
        .env("PILLBOX_API_URL", api_url)
        .env_remove("PILLBOX_PASSWORD")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success. Returns stdout.
pub async fn run_cli_success(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli(args, data_dir, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure. Returns stderr.
pub async fn run_cli_failure(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli(args, data_dir, api_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    assert_eq!(output.status.code(), Some(1));
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn envelope(data: Value) -> Value {
    json!({"success": true, "message": "ok", "data": data})
}

pub fn tokens_json(access: &str, access_in: Duration, refresh: &str, refresh_in: Duration) -> Value {
    let now = Utc::now();
    json!({
        "access": {"token": access, "expires": (now + access_in).to_rfc3339()},
        "refresh": {"token": refresh, "expires": (now + refresh_in).to_rfc3339()}
    })
}

/// Write a session file the way the file store does.
pub fn write_session(data_dir: &Path, access_in: Duration, refresh_in: Duration) {
    let now = Utc::now();
    let session = json!({
        "token": "access-old",
        "refresh_token": "refresh-old",
        "token_expiry_time": (now + access_in).to_rfc3339(),
        "refresh_token_expiry_time": (now + refresh_in).to_rfc3339(),
        "user": json!({
            "id": "u-1",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "user_type": "patient"
        })
        .to_string()
    });
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(
        data_dir.join("session.json"),
        serde_json::to_string_pretty(&session).unwrap(),
    )
    .unwrap();
}

/// Read the stored session as a JSON object, or `None` if it was removed.
pub fn read_session(data_dir: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(data_dir.join("session.json")).ok()?;
    Some(serde_json::from_str(&content).unwrap())
}
