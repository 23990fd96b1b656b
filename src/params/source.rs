//! Raw parameter collection
//!
//! Parameters arrive as untyped key/value pairs from three places: a
//! parameter file (JSON, YAML or TOML), `CLAWSTACK_*` environment variables,
//! and `--param KEY=VALUE` arguments. Keys are canonicalized through the
//! catalog on insertion; unknown keys are remembered but otherwise ignored.

use super::catalog::ParameterCatalog;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "CLAWSTACK_";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse parameter file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported parameter file format: {0} (expected .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Malformed parameter assignment '{0}', expected KEY=VALUE")]
    MalformedAssignment(String),

    #[error("Parameter '{key}' must be a scalar value")]
    NonScalar { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("toml") => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Untyped parameter values keyed by canonical parameter key
#[derive(Clone, Default, PartialEq)]
pub struct RawParameters {
    values: BTreeMap<&'static str, String>,
    ignored: Vec<String>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key.as_ref(), value);
        }
        params
    }

    /// Parses `KEY=VALUE` assignments as given on the command line
    pub fn from_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Self, SourceError> {
        let mut params = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (key, value) = assignment
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| SourceError::MalformedAssignment(assignment.to_string()))?;
            params.insert(key, value);
        }
        Ok(params)
    }

    /// Reads `CLAWSTACK_<KEY>` variables for every declared parameter
    pub fn from_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }

    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let catalog = ParameterCatalog::shared();
        let vars: BTreeMap<String, String> = vars.into_iter().collect();
        let mut params = Self::new();
        for spec in catalog.iter() {
            if let Some(value) = vars.get(&spec.env_var()) {
                debug!(var = %spec.env_var(), "Parameter taken from environment");
                params.insert(spec.key, value.clone());
            }
        }
        params
    }

    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let format = FileFormat::from_path(path)
            .ok_or_else(|| SourceError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str_with_format(&content, format).map_err(|e| match e {
            SourceError::Parse { message, .. } => SourceError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_str_with_format(content: &str, format: FileFormat) -> Result<Self, SourceError> {
        let parse_error = |message: String| SourceError::Parse {
            path: PathBuf::new(),
            message,
        };
        let document: Value = match format {
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
            FileFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
            FileFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        };
        Self::from_document(document)
    }

    /// Accepts a flat map, or the AWS CLI `[{"ParameterKey", "ParameterValue"}]` list
    fn from_document(document: Value) -> Result<Self, SourceError> {
        let mut params = Self::new();
        match document {
            Value::Object(map) => {
                for (key, value) in map {
                    if let Some(text) = scalar_to_string(&key, value)? {
                        params.insert(&key, text);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    let key = item
                        .get("ParameterKey")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| SourceError::Parse {
                            path: PathBuf::new(),
                            message: "list entries need a ParameterKey".to_string(),
                        })?;
                    let value = item.get("ParameterValue").cloned().unwrap_or(Value::Null);
                    if let Some(text) = scalar_to_string(&key, value)? {
                        params.insert(&key, text);
                    }
                }
            }
            Value::Null => {}
            _ => {
                return Err(SourceError::Parse {
                    path: PathBuf::new(),
                    message: "expected a map of parameters".to_string(),
                })
            }
        }
        Ok(params)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        match ParameterCatalog::shared().canonical_key(key) {
            Some(canonical) => {
                self.values.insert(canonical, value.into());
            }
            None => {
                debug!(key = %key, "Ignoring unknown parameter");
                if !self.ignored.iter().any(|k| k == key) {
                    self.ignored.push(key.to_string());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Values from `other` take precedence
    pub fn merge(mut self, other: RawParameters) -> Self {
        self.values.extend(other.values);
        for key in other.ignored {
            if !self.ignored.contains(&key) {
                self.ignored.push(key);
            }
        }
        self
    }

    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for RawParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catalog = ParameterCatalog::shared();
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            let secret = catalog
                .get(key)
                .map(|spec| spec.param_type == super::catalog::ParamType::Secret)
                .unwrap_or(false);
            if secret {
                map.entry(key, &"***");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

fn scalar_to_string(key: &str, value: Value) -> Result<Option<String>, SourceError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(SourceError::NonScalar {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::catalog::keys;

    #[test]
    fn test_assignments() {
        let params =
            RawParameters::from_assignments(&["MonthlyBudget=75", "useSpotPricing=true"]).unwrap();
        assert_eq!(params.get(keys::MONTHLY_BUDGET_LIMIT), Some("75"));
        assert_eq!(params.get(keys::USE_SPOT_PRICING), Some("true"));
    }

    #[test]
    fn test_assignment_value_may_contain_equals() {
        let params = RawParameters::from_assignments(&["telegramToken=12:ab=cd"]).unwrap();
        assert_eq!(params.get(keys::TELEGRAM_TOKEN), Some("12:ab=cd"));
    }

    #[test]
    fn test_malformed_assignment() {
        assert!(matches!(
            RawParameters::from_assignments(&["novalue"]),
            Err(SourceError::MalformedAssignment(_))
        ));
        assert!(RawParameters::from_assignments(&["=value"]).is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let params = RawParameters::from_pairs([("shoeSize", "44"), ("aiModel", "opus-4.5")]);
        assert_eq!(params.len(), 1);
        assert_eq!(params.ignored_keys(), &["shoeSize".to_string()]);
    }

    #[test]
    fn test_many_inserts_resolve_against_one_catalog() {
        let pairs: Vec<(String, String)> = (0..200)
            .map(|i| ("TelegramBotToken".to_string(), format!("{}:token", i)))
            .chain((0..200).map(|i| (format!("unknown{}", i % 3), i.to_string())))
            .collect();
        let params = RawParameters::from_pairs(pairs);
        assert_eq!(params.get(keys::TELEGRAM_TOKEN), Some("199:token"));
        assert_eq!(params.ignored_keys().len(), 3);
        assert!(std::ptr::eq(ParameterCatalog::shared(), ParameterCatalog::shared()));
    }

    #[test]
    fn test_merge_precedence() {
        let file = RawParameters::from_pairs([("shutdownHour", "20"), ("startupHour", "6")]);
        let cli = RawParameters::from_pairs([("ShutdownHour", "23")]);
        let merged = file.merge(cli);
        assert_eq!(merged.get(keys::SHUTDOWN_HOUR), Some("23"));
        assert_eq!(merged.get(keys::STARTUP_HOUR), Some("6"));
    }

    #[test]
    fn test_json_document_scalars() {
        let params = RawParameters::from_str_with_format(
            r#"{"MonthlyBudget": 120, "EnableGuardrails": true, "budgetAlertEmail": null}"#,
            FileFormat::Json,
        )
        .unwrap();
        assert_eq!(params.get(keys::MONTHLY_BUDGET_LIMIT), Some("120"));
        assert_eq!(params.get(keys::ENABLE_CONTENT_GUARDRAILS), Some("true"));
        assert!(!params.contains(keys::BUDGET_ALERT_EMAIL));
    }

    #[test]
    fn test_aws_cli_parameter_list() {
        let params = RawParameters::from_str_with_format(
            r#"[{"ParameterKey": "InstanceType", "ParameterValue": "t3.small"}]"#,
            FileFormat::Json,
        )
        .unwrap();
        assert_eq!(params.get(keys::INSTANCE_SIZE), Some("t3.small"));
    }

    #[test]
    fn test_nested_value_rejected() {
        let result = RawParameters::from_str_with_format(
            "aiModel:\n  nested: true\n",
            FileFormat::Yaml,
        );
        assert!(matches!(result, Err(SourceError::NonScalar { .. })));
    }

    #[test]
    fn test_env_vars() {
        let params = RawParameters::from_env_vars(vec![
            ("CLAWSTACK_TELEGRAM_TOKEN".to_string(), "42:xyz".to_string()),
            ("CLAWSTACK_SHUTDOWN_HOUR".to_string(), "21".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);
        assert_eq!(params.get(keys::TELEGRAM_TOKEN), Some("42:xyz"));
        assert_eq!(params.get(keys::SHUTDOWN_HOUR), Some("21"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_debug_redacts_token() {
        let params = RawParameters::from_pairs([("telegramToken", "42:very-secret")]);
        let rendered = format!("{:?}", params);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("params.YML")),
            Some(FileFormat::Yaml)
        );
        assert_eq!(FileFormat::from_path(Path::new("params.ini")), None);
    }
}
