use super::catalog::ParamType;
use super::secret::SecretString;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};
use thiserror::Error;

/// A single violated parameter constraint
///
/// Secret values are never carried in a violation.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    #[error("{key}: required parameter is missing")]
    Missing { key: String },

    #[error("{key}: '{value}' is not one of [{}]", .allowed.join(", "))]
    NotAllowed {
        key: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{key}: {value} is outside the range {min}..={max}")]
    OutOfRange {
        key: String,
        value: String,
        min: f64,
        max: f64,
    },

    #[error("{key}: {value} must be greater than zero")]
    NotPositive { key: String, value: String },

    #[error("{key}: '{value}' is not a valid {expected}")]
    InvalidType {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("{key}: '{value}' must be {description}")]
    PatternMismatch {
        key: String,
        value: String,
        description: &'static str,
    },

    #[error("{key}: {reason}")]
    InvalidSecret { key: String, reason: &'static str },
}

impl Violation {
    pub fn key(&self) -> &str {
        match self {
            Self::Missing { key }
            | Self::NotAllowed { key, .. }
            | Self::OutOfRange { key, .. }
            | Self::NotPositive { key, .. }
            | Self::InvalidType { key, .. }
            | Self::PatternMismatch { key, .. }
            | Self::InvalidSecret { key, .. } => key,
        }
    }
}

/// A parameter value after parsing and constraint checking
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Secret(SecretString),
    Number(f64),
    Integer(i64),
    Bool(bool),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    AllowedValues {
        values: Vec<&'static str>,
        /// Alternative spellings mapped to the value they stand for
        #[serde(skip_serializing_if = "Vec::is_empty")]
        aliases: Vec<(&'static str, &'static str)>,
    },
    Range {
        min: f64,
        max: f64,
    },
    Positive,
    Pattern {
        pattern: &'static str,
        description: &'static str,
    },
    Boolean,
    Secret,
}

impl Constraint {
    /// Parses `raw` as `param_type` and checks it against this constraint
    pub fn parse(
        &self,
        key: &str,
        param_type: ParamType,
        raw: &str,
    ) -> Result<ParamValue, Violation> {
        let value = self.normalize(parse_typed(key, param_type, raw)?);
        self.check(key, raw, &value)?;
        Ok(value)
    }

    /// Maps aliases and differently-cased spellings onto the canonical value
    fn normalize(&self, value: ParamValue) -> ParamValue {
        match (self, value) {
            (Self::AllowedValues { values, aliases }, ParamValue::Text(text)) => {
                let canonical = values
                    .iter()
                    .find(|v| v.eq_ignore_ascii_case(&text))
                    .or_else(|| {
                        aliases
                            .iter()
                            .find(|(alias, _)| alias.eq_ignore_ascii_case(&text))
                            .map(|(_, v)| v)
                    });
                ParamValue::Text(canonical.map(|v| v.to_string()).unwrap_or(text))
            }
            (_, value) => value,
        }
    }

    fn check(&self, key: &str, raw: &str, value: &ParamValue) -> Result<(), Violation> {
        match (self, value) {
            (Self::AllowedValues { values, .. }, ParamValue::Text(text)) => {
                if values.iter().any(|v| v == text) {
                    Ok(())
                } else {
                    Err(Violation::NotAllowed {
                        key: key.to_string(),
                        value: raw.to_string(),
                        allowed: values.iter().map(|v| v.to_string()).collect(),
                    })
                }
            }
            (Self::Range { min, max }, ParamValue::Number(n)) => check_range(key, raw, *n, *min, *max),
            (Self::Range { min, max }, ParamValue::Integer(n)) => {
                check_range(key, raw, *n as f64, *min, *max)
            }
            (Self::Positive, ParamValue::Number(n)) if *n > 0.0 => Ok(()),
            (Self::Positive, ParamValue::Number(_)) => Err(Violation::NotPositive {
                key: key.to_string(),
                value: raw.trim().to_string(),
            }),
            (
                Self::Pattern {
                    pattern,
                    description,
                },
                ParamValue::Text(text),
            ) => {
                let matched = compiled(*pattern).is_match(text);
                if matched {
                    Ok(())
                } else {
                    Err(Violation::PatternMismatch {
                        key: key.to_string(),
                        value: text.clone(),
                        description: *description,
                    })
                }
            }
            (Self::Boolean, ParamValue::Bool(_)) => Ok(()),
            (Self::Secret, ParamValue::Secret(secret)) => check_secret(key, secret),
            _ => Err(Violation::InvalidType {
                key: key.to_string(),
                value: raw.to_string(),
                expected: "value for this parameter",
            }),
        }
    }
}

fn parse_typed(key: &str, param_type: ParamType, raw: &str) -> Result<ParamValue, Violation> {
    let trimmed = raw.trim();
    let invalid = |expected| Violation::InvalidType {
        key: key.to_string(),
        value: trimmed.to_string(),
        expected,
    };

    match param_type {
        ParamType::String | ParamType::Enum => Ok(ParamValue::Text(trimmed.to_string())),
        ParamType::Secret => Ok(ParamValue::Secret(SecretString::new(trimmed))),
        ParamType::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ParamValue::Number)
            .ok_or_else(|| invalid("number")),
        ParamType::Integer => trimmed
            .parse::<i64>()
            .map(ParamValue::Integer)
            .map_err(|_| invalid("integer")),
        ParamType::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(ParamValue::Bool(true)),
            "false" => Ok(ParamValue::Bool(false)),
            _ => Err(invalid("boolean (true or false)")),
        },
    }
}

fn check_range(key: &str, raw: &str, n: f64, min: f64, max: f64) -> Result<(), Violation> {
    if (min..=max).contains(&n) {
        Ok(())
    } else {
        Err(Violation::OutOfRange {
            key: key.to_string(),
            value: raw.trim().to_string(),
            min,
            max,
        })
    }
}

fn check_secret(key: &str, secret: &SecretString) -> Result<(), Violation> {
    if secret.is_empty() {
        return Err(Violation::InvalidSecret {
            key: key.to_string(),
            reason: "must not be empty",
        });
    }
    if secret.expose().chars().any(char::is_whitespace) {
        return Err(Violation::InvalidSecret {
            key: key.to_string(),
            reason: "must not contain whitespace",
        });
    }
    Ok(())
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowedValues { values, .. } => write!(f, "one of {}", values.join(", ")),
            Self::Range { min, max } => write!(f, "{}..={}", min, max),
            Self::Positive => f.write_str("greater than zero"),
            Self::Pattern { description, .. } => f.write_str(description),
            Self::Boolean => f.write_str("true or false"),
            Self::Secret => f.write_str("non-empty, no whitespace"),
        }
    }
}

/// Compiles each catalog pattern once per process
fn compiled(pattern: &'static str) -> Regex {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, Regex>>> = OnceLock::new();
    let mut cache = CACHE
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(pattern)
        .or_insert_with(|| Regex::new(pattern).expect("catalog pattern is a valid regex"))
        .clone()
}
