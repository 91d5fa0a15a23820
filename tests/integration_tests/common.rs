// shared utilities for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// get path to the built pactl binary
pub fn pactl_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pactl"))
}

/// fresh project directory for one test
pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create test directory")
}

/// write `profiles.json5` into `dir`
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("profiles.json5");
    fs::write(&path, content).expect("Failed to write test config");
    path
}

/// run pactl inside `dir` with a clean environment
pub fn run_pactl(dir: &Path, args: &[&str]) -> Output {
    Command::new(pactl_binary_path())
        .args(args)
        .current_dir(dir)
        .env_remove("PACTL_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pactl")
}

/// run pactl with extra environment variables
pub fn run_pactl_with_env(dir: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(pactl_binary_path());
    cmd.args(args).current_dir(dir).env_remove("RUST_LOG");

    for (key, value) in env_vars {
        cmd.env(key, value);
    }

    cmd.output().expect("Failed to run pactl")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// parse the JSON-RPC `result` object printed on stdout
pub fn json_result(output: &Output) -> serde_json::Value {
    let json: serde_json::Value = serde_json::from_str(stdout(output).trim())
        .unwrap_or_else(|e| panic!("invalid JSON output ({}): {}", e, stdout(output)));
    assert_eq!(json["jsonrpc"], "2.0");
    json["result"].clone()
}

/// parse the JSON-RPC `error` object printed on stdout
pub fn json_error(output: &Output) -> serde_json::Value {
    let json: serde_json::Value = serde_json::from_str(stdout(output).trim())
        .unwrap_or_else(|e| panic!("invalid JSON output ({}): {}", e, stdout(output)));
    json["error"].clone()
}
