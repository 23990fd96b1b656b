//! Resolved stack configuration
//!
//! A [`StackConfig`] is only ever produced by
//! [`ConfigValidator`](crate::params::ConfigValidator): holding one means
//! every parameter satisfied its constraint. The composer consumes it
//! read-only.
//!
//! # Example
//!
//! ```
//! use clawstack::config::StackConfig;
//!
//! let config = StackConfig::from_pairs([
//!     ("telegramToken", "123456:ABC-DEF"),
//!     ("scheduleEnabled", "true"),
//! ])
//! .expect("valid configuration");
//! assert!(config.schedule.enabled);
//! assert_eq!(config.schedule.shutdown_hour, 22);
//! ```

use crate::params::choices::{BedrockModel, InstanceSize, Product};
use crate::params::rules::Violation;
use crate::params::secret::SecretString;
use crate::params::source::RawParameters;
use crate::params::validator::ConfigValidator;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Every constraint violated by one set of parameters
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{}", render_violations(.violations))]
pub struct ConfigurationError {
    pub violations: Vec<Violation>,
}

impl ConfigurationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.violations.iter().map(Violation::key).collect()
    }
}

fn render_violations(violations: &[Violation]) -> String {
    let plural = if violations.len() == 1 { "" } else { "s" };
    let mut out = format!("invalid configuration ({} violation{})", violations.len(), plural);
    for violation in violations {
        out.push_str(&format!("\n  - {}", violation));
    }
    out
}

/// An optional subgraph gated by one boolean parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    ContentGuardrails,
    PowerSchedule,
    WeekendShutdown,
    SpotPricing,
}

impl Feature {
    pub fn all() -> [Feature; 4] {
        [
            Feature::ContentGuardrails,
            Feature::PowerSchedule,
            Feature::WeekendShutdown,
            Feature::SpotPricing,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Feature::ContentGuardrails => "content guardrails",
            Feature::PowerSchedule => "power schedule",
            Feature::WeekendShutdown => "weekend shutdown",
            Feature::SpotPricing => "spot pricing",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// UTC hour, 0-23
    pub shutdown_hour: u8,
    /// UTC hour, 0-23
    pub startup_hour: u8,
    /// Only honoured when `enabled` is set
    pub weekend_shutdown: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            shutdown_hour: 22,
            startup_hour: 8,
            weekend_shutdown: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpotConfig {
    pub enabled: bool,
    pub max_hourly_price: f64,
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_hourly_price: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    pub product: Product,
    #[serde(skip)]
    pub telegram_token: SecretString,
    pub ai_model: BedrockModel,
    pub instance_size: InstanceSize,
    pub monthly_budget_limit: f64,
    pub enable_content_guardrails: bool,
    /// `None` when no alert email was supplied
    pub budget_alert_email: Option<String>,
    pub schedule: ScheduleConfig,
    pub spot: SpotConfig,
}

impl StackConfig {
    /// Validates raw key/value pairs with the standard catalog
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        ConfigValidator::new().validate(&RawParameters::from_pairs(pairs))
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::ContentGuardrails => self.enable_content_guardrails,
            Feature::PowerSchedule => self.schedule.enabled,
            Feature::WeekendShutdown => self.schedule.enabled && self.schedule.weekend_shutdown,
            Feature::SpotPricing => self.spot.enabled,
        }
    }

    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::all()
            .into_iter()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }
}
