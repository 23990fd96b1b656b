//! CLI integration tests
//!
//! These tests run the built binary and check:
//! - Command parsing
//! - Template and report output
//! - Exit codes

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the clawstack binary
fn clawstack_bin() -> PathBuf {
    // In tests, the binary should be at target/debug/clawstack
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // If we're in deps/, go up one more level
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("clawstack")
}

/// Runs the binary with a clean `CLAWSTACK_*` environment
fn run(args: &[&str]) -> Output {
    let mut command = Command::new(clawstack_bin());
    for (key, _) in env::vars() {
        if key.starts_with("CLAWSTACK_") {
            command.env_remove(key);
        }
    }
    command
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute clawstack")
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("clawstack"));
    assert!(stdout.contains("synth"));
    assert!(stdout.contains("validate"));
    assert!(stdout.contains("estimate"));
    assert!(stdout.contains("params"));
}

#[test]
fn test_cli_version() {
    let output = run(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_synth_prints_json_template() {
    let output = run(&["-q", "synth", "--param", "telegramToken=424242:cli-secret"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("cli-secret"));

    let template: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(template["Resources"]["OpenClawInstance"].is_object());
    assert!(template["Outputs"]["ConnectCommand"].is_object());
}

#[test]
fn test_synth_yaml_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("stack.yaml");
    let output = run(&[
        "-q",
        "synth",
        "-p",
        "telegramToken=1:a",
        "-p",
        "product=clawdbot",
        "--format",
        "yaml",
        "--output",
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("AWSTemplateFormatVersion"));
    assert!(content.contains("ClawdbotInstance"));
}

#[test]
fn test_synth_from_params_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("params.toml");
    fs::write(
        &file,
        "telegramToken = \"1:a\"\nproduct = \"moltbot\"\nscheduleEnabled = true\n",
    )
    .unwrap();

    let output = run(&["-q", "synth", "--params-file", file.to_str().unwrap()]);
    assert!(output.status.success());
    let template: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(template["Resources"]["PowerControlFunction"].is_object());
    assert!(template["Resources"]["MoltbotInstance"].is_object());
}

#[test]
fn test_synth_invalid_config_exits_1() {
    let output = run(&["synth", "-p", "monthlyBudgetLimit=5"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("telegramToken"));
    assert!(stderr.contains("monthlyBudgetLimit"));
}

#[test]
fn test_validate_json_report() {
    let output = run(&[
        "validate",
        "-p",
        "instanceSize=m5.large",
        "-p",
        "startupHour=25",
        "--format",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["violations"].as_array().unwrap().len(), 3);
}

#[test]
fn test_validate_human_success() {
    let output = run(&["validate", "-p", "telegramToken=1:a", "-p", "useSpotPricing=true"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration valid"));
    assert!(stdout.contains("spot pricing"));
}

#[test]
fn test_estimate_json() {
    let output = run(&[
        "estimate",
        "-p",
        "telegramToken=1:a",
        "-p",
        "scheduleEnabled=true",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let estimate: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(estimate["active_hours"], 430);
}

#[test]
fn test_params_lists_catalog() {
    let output = run(&["params"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("telegramToken"));
    assert!(stdout.contains("CLAWSTACK_MONTHLY_BUDGET_LIMIT"));
}

#[test]
fn test_unreadable_params_file_exits_1() {
    let output = run(&["synth", "--params-file", "/nonexistent/params.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/params.json"));
}

#[test]
fn test_invalid_subcommand() {
    let output = run(&["deploy"]);
    assert!(!output.status.success());
}
