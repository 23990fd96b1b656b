//! Output formatting integration tests
//!
//! Covers every output format (JSON, YAML, human-readable) for:
//! - Validation reports
//! - Cost estimates
//! - The parameter catalog
//! - Rendered templates

use clawstack::cli::output::{OutputFormat, OutputFormatter, ValidationReport};
use clawstack::{
    Composer, ConfigValidator, CostEstimate, ParameterCatalog, RawParameters, StackConfig,
    TemplateFormat,
};

fn scheduled_config() -> StackConfig {
    StackConfig::from_pairs([
        ("telegramToken", "1:a"),
        ("scheduleEnabled", "true"),
        ("weekendShutdownEnabled", "true"),
    ])
    .unwrap()
}

#[test]
fn test_estimate_all_formats() {
    let estimate = CostEstimate::for_config(&scheduled_config());

    let json = OutputFormatter::new(OutputFormat::Json)
        .format_estimate(&estimate)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["pricing"], "on-demand");
    assert_eq!(value["total_hours"], 730);

    let yaml = OutputFormatter::new(OutputFormat::Yaml)
        .format_estimate(&estimate)
        .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(value["instance_size"], "t3.micro");

    let human = OutputFormatter::new(OutputFormat::Human)
        .format_estimate(&estimate)
        .unwrap();
    assert!(human.contains("Cost Estimate"));
    assert!(human.contains("Active hours:"));
    assert!(human.contains("Savings:"));
}

#[test]
fn test_validation_report_with_advisory() {
    let config = StackConfig::from_pairs([
        ("telegramToken", "1:a"),
        ("scheduleEnabled", "true"),
        ("shutdownHour", "8"),
        ("startupHour", "8"),
    ])
    .unwrap();
    let advisories = ConfigValidator::new().advise(&config);
    assert!(!advisories.is_empty());
    let report = ValidationReport::accepted(&config, advisories, Vec::new());

    let human = OutputFormatter::new(OutputFormat::Human)
        .format_validation(&report)
        .unwrap();
    assert!(human.contains("Advisories:"));
    assert!(human.contains("ZeroLengthSchedule"));

    let yaml = OutputFormatter::new(OutputFormat::Yaml)
        .format_validation(&report)
        .unwrap();
    assert!(yaml.contains("valid: true"));
    assert!(yaml.contains("power_schedule"));
}

#[test]
fn test_validation_report_never_leaks_secret() {
    let raw = RawParameters::from_pairs([("telegramToken", "no colon here"), ("shutdownHour", "99")]);
    let err = ConfigValidator::new().validate(&raw).unwrap_err();
    let report = ValidationReport::rejected(&err, Vec::new());

    for format in [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::Human] {
        let text = OutputFormatter::new(format).format_validation(&report).unwrap();
        assert!(!text.contains("no colon here"), "{:?} leaked the token", format);
        assert!(text.contains("shutdownHour"));
    }
}

#[test]
fn test_catalog_json_lists_every_parameter() {
    let catalog = ParameterCatalog::standard();
    let json = OutputFormatter::new(OutputFormat::Json)
        .format_catalog(&catalog)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let parameters = value["parameters"].as_array().unwrap();
    assert_eq!(parameters.len(), catalog.len());
    assert!(parameters.iter().any(|p| p["key"] == "telegramToken" && p["default"].is_null()));
}

#[test]
fn test_template_json_and_yaml_agree() {
    let raw = RawParameters::from_pairs([("telegramToken", "1:a"), ("enableContentGuardrails", "true")]);
    let template = Composer::new().synthesize(&raw).unwrap().template();

    let from_json: serde_json::Value =
        serde_json::from_str(&template.render(TemplateFormat::Json).unwrap()).unwrap();
    let from_yaml: serde_json::Value =
        serde_yaml::from_str(&template.render(TemplateFormat::Yaml).unwrap()).unwrap();
    assert_eq!(from_json, from_yaml);
    assert!(from_json["Outputs"]["GuardrailId"].is_object());
}
