use super::advisories::{
    Advisory, AdvisoryRule, SpotPriceAboveOnDemandRule, UnusedWeekendShutdownRule,
    ZeroLengthScheduleRule,
};
use super::catalog::{keys, ParameterCatalog};
use super::choices::{BedrockModel, InstanceSize, Product};
use super::rules::{ParamValue, Violation};
use super::secret::SecretString;
use super::source::RawParameters;
use crate::config::{ConfigurationError, ScheduleConfig, SpotConfig, StackConfig};
use tracing::{debug, warn};

/// Turns raw parameters into a [`StackConfig`], reporting every violation at once
pub struct ConfigValidator {
    catalog: ParameterCatalog,
    rules: Vec<Box<dyn AdvisoryRule>>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn AdvisoryRule>>) -> Self {
        Self {
            catalog: ParameterCatalog::standard(),
            rules,
        }
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn validate(&self, raw: &RawParameters) -> Result<StackConfig, ConfigurationError> {
        for key in raw.ignored_keys() {
            debug!(key = %key, "Unknown parameter ignored");
        }

        let mut resolver = Resolver {
            catalog: &self.catalog,
            raw,
            violations: Vec::new(),
        };

        let product = resolver.choice(keys::PRODUCT, Product::from_value);
        let telegram_token = resolver.secret(keys::TELEGRAM_TOKEN);
        let ai_model = resolver.choice(keys::AI_MODEL, BedrockModel::from_value);
        let instance_size = resolver.choice(keys::INSTANCE_SIZE, InstanceSize::from_value);
        let monthly_budget_limit = resolver.number(keys::MONTHLY_BUDGET_LIMIT);
        let enable_content_guardrails = resolver.flag(keys::ENABLE_CONTENT_GUARDRAILS);
        let budget_alert_email = resolver.text(keys::BUDGET_ALERT_EMAIL);
        let schedule = ScheduleConfig {
            enabled: resolver.flag(keys::SCHEDULE_ENABLED),
            shutdown_hour: resolver.hour(keys::SHUTDOWN_HOUR),
            startup_hour: resolver.hour(keys::STARTUP_HOUR),
            weekend_shutdown: resolver.flag(keys::WEEKEND_SHUTDOWN_ENABLED),
        };
        let spot = SpotConfig {
            enabled: resolver.flag(keys::USE_SPOT_PRICING),
            max_hourly_price: resolver.number(keys::SPOT_MAX_HOURLY_PRICE),
        };

        if !resolver.violations.is_empty() {
            debug!(
                count = resolver.violations.len(),
                "Parameter validation failed"
            );
            return Err(ConfigurationError::new(resolver.violations));
        }

        Ok(StackConfig {
            product,
            telegram_token,
            ai_model,
            instance_size,
            monthly_budget_limit,
            enable_content_guardrails,
            budget_alert_email: Some(budget_alert_email).filter(|e| !e.is_empty()),
            schedule,
            spot,
        })
    }

    /// Non-fatal observations about a valid configuration
    pub fn advise(&self, config: &StackConfig) -> Vec<Advisory> {
        let advisories: Vec<Advisory> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.check(config).map(|message| Advisory {
                    rule: rule.name(),
                    message,
                })
            })
            .collect();
        for advisory in &advisories {
            warn!(rule = advisory.rule, "{}", advisory.message);
        }
        advisories
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::with_rules(vec![
            Box::new(ZeroLengthScheduleRule),
            Box::new(UnusedWeekendShutdownRule),
            Box::new(SpotPriceAboveOnDemandRule),
        ])
    }
}

/// Looks up and checks one parameter at a time, recording violations and
/// handing back a fallback so every remaining parameter still gets checked
struct Resolver<'a> {
    catalog: &'a ParameterCatalog,
    raw: &'a RawParameters,
    violations: Vec<Violation>,
}

impl Resolver<'_> {
    fn value(&mut self, key: &'static str) -> Option<ParamValue> {
        let Some(spec) = self.catalog.get(key) else {
            self.violations.push(Violation::Missing {
                key: key.to_string(),
            });
            return None;
        };
        let Some(raw) = self.raw.get(key).or(spec.default) else {
            self.violations.push(Violation::Missing {
                key: key.to_string(),
            });
            return None;
        };
        match spec.constraint.parse(key, spec.param_type, raw) {
            Ok(value) => Some(value),
            Err(violation) => {
                self.violations.push(violation);
                None
            }
        }
    }

    fn choice<T: Default>(&mut self, key: &'static str, lookup: fn(&str) -> Option<T>) -> T {
        match self.value(key) {
            Some(ParamValue::Text(text)) => lookup(&text).unwrap_or_default(),
            _ => T::default(),
        }
    }

    fn flag(&mut self, key: &'static str) -> bool {
        matches!(self.value(key), Some(ParamValue::Bool(true)))
    }

    fn number(&mut self, key: &'static str) -> f64 {
        match self.value(key) {
            Some(ParamValue::Number(n)) => n,
            _ => 0.0,
        }
    }

    fn hour(&mut self, key: &'static str) -> u8 {
        match self.value(key) {
            Some(ParamValue::Integer(n)) => u8::try_from(n).unwrap_or(0),
            _ => 0,
        }
    }

    fn text(&mut self, key: &'static str) -> String {
        match self.value(key) {
            Some(ParamValue::Text(text)) => text,
            _ => String::new(),
        }
    }

    fn secret(&mut self, key: &'static str) -> SecretString {
        match self.value(key) {
            Some(ParamValue::Secret(secret)) => secret,
            _ => SecretString::new(""),
        }
    }
}
