// shared utilities for integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn ruleop_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ruleop"))
}

/// fresh temporary directory, removed on drop
pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create test directory")
}

/// write a config file into `dir`
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, content).expect("Failed to write test config");
    path
}

/// run ruleop against an explicit config path with a clean environment
pub fn run_ruleop(args: &[&str], config_path: &Path) -> Output {
    Command::new(ruleop_binary_path())
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("RULEOP_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run ruleop")
}

/// run with `--json` and parse the JSON-RPC envelope
pub fn run_json(args: &[&str], config_path: &Path) -> (i32, serde_json::Value) {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_ruleop(&full, config_path);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "expected JSON output: {}\nstdout: {}\nstderr: {}",
            e, stdout, stderr
        )
    });

    assert_eq!(json["jsonrpc"], "2.0");
    assert!(json["id"].is_null());
    (output.status.code().unwrap_or(-1), json)
}

/// stdout as a string
pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
