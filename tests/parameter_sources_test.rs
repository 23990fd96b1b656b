//! Parameter collection from files, environment and arguments

use clawstack::cli::commands::ParameterSourceArgs;
use clawstack::cli::handlers::load_parameters;
use clawstack::params::{keys, FileFormat, RawParameters, SourceError};
use clawstack::StackConfig;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write parameter file");
    path
}

#[test]
fn test_aws_cli_parameter_list() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "params.json",
        r#"[
  {"ParameterKey": "TelegramBotToken", "ParameterValue": "1:cli-list"},
  {"ParameterKey": "MonthlyBudget", "ParameterValue": "120"},
  {"ParameterKey": "EnableGuardrails", "ParameterValue": "true"}
]"#,
    );

    let raw = RawParameters::from_file(&path).unwrap();
    assert_eq!(raw.get(keys::TELEGRAM_TOKEN), Some("1:cli-list"));
    assert_eq!(raw.get(keys::MONTHLY_BUDGET_LIMIT), Some("120"));

    let config = clawstack::ConfigValidator::new().validate(&raw).unwrap();
    assert_eq!(config.monthly_budget_limit, 120.0);
    assert!(config.enable_content_guardrails);
}

#[test]
fn test_toml_file_with_native_types() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "params.toml",
        "telegramToken = \"1:toml\"\nshutdownHour = 23\nspotMaxHourlyPrice = 0.004\nuseSpotPricing = true\n",
    );

    let raw = RawParameters::from_file(&path).unwrap();
    let config = clawstack::ConfigValidator::new().validate(&raw).unwrap();
    assert_eq!(config.schedule.shutdown_hour, 23);
    assert!(config.spot.enabled);
    assert_eq!(config.spot.max_hourly_price, 0.004);
}

#[test]
fn test_yaml_unknown_keys_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "params.yml",
        "telegramToken: \"1:yaml\"\nregion: eu-west-1\n",
    );

    let raw = RawParameters::from_file(&path).unwrap();
    assert_eq!(raw.ignored_keys(), ["region".to_string()]);
    assert!(StackConfig::from_pairs([(keys::TELEGRAM_TOKEN, "1:yaml")]).is_ok());
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "params.ini", "telegramToken=1:a");

    assert_eq!(FileFormat::from_path(&path), None);
    assert!(matches!(
        RawParameters::from_file(&path),
        Err(SourceError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_nested_value_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "params.json", r#"{"telegramToken": {"value": "1:a"}}"#);

    assert!(matches!(
        RawParameters::from_file(&path),
        Err(SourceError::NonScalar { .. })
    ));
}

#[test]
#[serial]
fn test_precedence_file_env_cli() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "params.yaml",
        "telegramToken: \"1:file\"\nmonthlyBudgetLimit: 20\nshutdownHour: 21\nstartupHour: 6\n",
    );

    env::set_var("CLAWSTACK_MONTHLY_BUDGET_LIMIT", "30");
    env::set_var("CLAWSTACK_SHUTDOWN_HOUR", "20");
    let args = ParameterSourceArgs {
        params_file: Some(path),
        params: vec!["shutdownHour=19".to_string()],
        no_env: false,
    };
    let raw = load_parameters(&args);
    env::remove_var("CLAWSTACK_MONTHLY_BUDGET_LIMIT");
    env::remove_var("CLAWSTACK_SHUTDOWN_HOUR");

    let raw = raw.unwrap();
    assert_eq!(raw.get(keys::TELEGRAM_TOKEN), Some("1:file"));
    assert_eq!(raw.get(keys::STARTUP_HOUR), Some("6"));
    assert_eq!(raw.get(keys::MONTHLY_BUDGET_LIMIT), Some("30"));
    assert_eq!(raw.get(keys::SHUTDOWN_HOUR), Some("19"));
}

#[test]
#[serial]
fn test_no_env_skips_environment() {
    env::set_var("CLAWSTACK_TELEGRAM_TOKEN", "1:from-env");
    let args = ParameterSourceArgs {
        params_file: None,
        params: Vec::new(),
        no_env: true,
    };
    let raw = load_parameters(&args);
    env::remove_var("CLAWSTACK_TELEGRAM_TOKEN");

    assert!(raw.unwrap().get(keys::TELEGRAM_TOKEN).is_none());
}

#[test]
#[serial]
fn test_env_token_is_used() {
    env::set_var("CLAWSTACK_TELEGRAM_TOKEN", "1:from-env");
    let raw = RawParameters::from_env();
    env::remove_var("CLAWSTACK_TELEGRAM_TOKEN");

    assert_eq!(raw.get(keys::TELEGRAM_TOKEN), Some("1:from-env"));
}
