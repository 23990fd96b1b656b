//! Output formatting for multiple formats
//!
//! JSON and YAML are meant for scripts; the human format mirrors what an
//! operator wants to see in a terminal.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::{ConfigurationError, Feature, StackConfig};
use crate::estimate::CostEstimate;
use crate::params::{Advisory, ParameterCatalog, Violation};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Outcome of `validate`, shaped for serialization
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<&'static str>,
    pub features: Vec<Feature>,
    pub violations: Vec<Violation>,
    pub advisories: Vec<Advisory>,
    pub ignored_keys: Vec<String>,
}

impl ValidationReport {
    pub fn accepted(config: &StackConfig, advisories: Vec<Advisory>, ignored_keys: Vec<String>) -> Self {
        Self {
            valid: true,
            product: Some(config.product.name()),
            features: config.enabled_features(),
            violations: Vec::new(),
            advisories,
            ignored_keys,
        }
    }

    pub fn rejected(error: &ConfigurationError, ignored_keys: Vec<String>) -> Self {
        Self {
            valid: false,
            product: None,
            features: Vec::new(),
            violations: error.violations.clone(),
            advisories: Vec::new(),
            ignored_keys,
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_validation(&self, report: &ValidationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "validation report"),
            OutputFormat::Yaml => to_yaml(report, "validation report"),
            OutputFormat::Human => Ok(self.format_validation_human(report)),
        }
    }

    pub fn format_estimate(&self, estimate: &CostEstimate) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(estimate, "cost estimate"),
            OutputFormat::Yaml => to_yaml(estimate, "cost estimate"),
            OutputFormat::Human => Ok(format!("Cost Estimate\n{}\n\n{}\n", RULE, estimate)),
        }
    }

    pub fn format_catalog(&self, catalog: &ParameterCatalog) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(catalog, "parameter catalog"),
            OutputFormat::Yaml => to_yaml(catalog, "parameter catalog"),
            OutputFormat::Human => Ok(self.format_catalog_human(catalog)),
        }
    }

    fn format_validation_human(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        if report.valid {
            output.push_str("\u{2713} Configuration valid\n");
        } else {
            output.push_str(&format!(
                "\u{2717} Configuration invalid ({} violation{})\n",
                report.violations.len(),
                if report.violations.len() == 1 { "" } else { "s" }
            ));
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        if let Some(product) = report.product {
            output.push_str(&format!("Product:   {}\n", product));
            let features = if report.features.is_empty() {
                "(none)".to_string()
            } else {
                report
                    .features
                    .iter()
                    .map(Feature::name)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            output.push_str(&format!("Features:  {}\n\n", features));
        }

        push_tree(
            &mut output,
            "Violations",
            report.violations.iter().map(|v| v.to_string()),
        );
        push_tree(
            &mut output,
            "Advisories",
            report
                .advisories
                .iter()
                .map(|a| format!("{}: {}", a.rule, a.message)),
        );
        push_tree(
            &mut output,
            "Ignored keys",
            report.ignored_keys.iter().cloned(),
        );
        output
    }

    fn format_catalog_human(&self, catalog: &ParameterCatalog) -> String {
        let mut output = format!("Stack Parameters\n{}\n\n", RULE);
        for spec in catalog.iter() {
            output.push_str(&format!("{}\n", spec.key));
            output.push_str(&format!("\u{251C}\u{2500} {}\n", spec.description));
            let default = match spec.default {
                None => "(required)".to_string(),
                Some("") => "(empty)".to_string(),
                Some(value) => value.to_string(),
            };
            output.push_str(&format!("\u{251C}\u{2500} Default:     {}\n", default));
            output.push_str(&format!("\u{251C}\u{2500} Constraint:  {}\n", spec.constraint));
            if !spec.aliases.is_empty() {
                output.push_str(&format!(
                    "\u{251C}\u{2500} Aliases:     {}\n",
                    spec.aliases.join(", ")
                ));
            }
            output.push_str(&format!("\u{2514}\u{2500} Environment: {}\n\n", spec.env_var()));
        }
        output
    }
}

fn push_tree(output: &mut String, title: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("{}:\n", title));
    for (i, item) in items.iter().enumerate() {
        let connector = if i == items.len() - 1 { "\u{2514}" } else { "\u{251C}" };
        output.push_str(&format!("{}\u{2500} {}\n", connector, item));
    }
    output.push('\n');
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParameters;
    use crate::params::ConfigValidator;

    fn accepted() -> ValidationReport {
        let config = StackConfig::from_pairs([
            ("telegramToken", "1:a"),
            ("scheduleEnabled", "true"),
        ])
        .unwrap();
        ValidationReport::accepted(&config, Vec::new(), vec!["shoeSize".to_string()])
    }

    fn rejected() -> ValidationReport {
        let raw = RawParameters::from_pairs([("monthlyBudgetLimit", "5"), ("instanceSize", "m5.large")]);
        let err = ConfigValidator::new().validate(&raw).unwrap_err();
        ValidationReport::rejected(&err, Vec::new())
    }

    #[test]
    fn test_validation_human() {
        let text = OutputFormatter::new(OutputFormat::Human)
            .format_validation(&accepted())
            .unwrap();
        assert!(text.contains("Configuration valid"));
        assert!(text.contains("Product:   OpenClaw"));
        assert!(text.contains("shoeSize"));

        let text = OutputFormatter::new(OutputFormat::Human)
            .format_validation(&rejected())
            .unwrap();
        assert!(text.contains("Configuration invalid (3 violations)"));
        assert!(text.contains("monthlyBudgetLimit"));
    }

    #[test]
    fn test_validation_json() {
        let text = OutputFormatter::new(OutputFormat::Json)
            .format_validation(&rejected())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["violations"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_catalog_formats() {
        let catalog = ParameterCatalog::standard();
        let human = OutputFormatter::new(OutputFormat::Human)
            .format_catalog(&catalog)
            .unwrap();
        assert!(human.contains("CLAWSTACK_TELEGRAM_TOKEN"));
        assert!(human.contains("(required)"));

        let yaml = OutputFormatter::new(OutputFormat::Yaml)
            .format_catalog(&catalog)
            .unwrap();
        assert!(yaml.contains("monthlyBudgetLimit"));
    }

    #[test]
    fn test_estimate_human() {
        let config = StackConfig::from_pairs([("telegramToken", "1:a")]).unwrap();
        let text = OutputFormatter::new(OutputFormat::Human)
            .format_estimate(&CostEstimate::for_config(&config))
            .unwrap();
        assert!(text.contains("Monthly cost:  $7.59"));
    }
}
