//! Declared stack parameters
//!
//! Every parameter the composer understands is declared once here with its
//! canonical key, the CloudFormation-style aliases accepted from older
//! parameter files, its type, its default and the constraint its value must
//! satisfy.

use super::choices::{BedrockModel, InstanceSize, Product};
use super::rules::Constraint;
use serde::Serialize;
use std::sync::OnceLock;

pub mod keys {
    pub const PRODUCT: &str = "product";
    pub const TELEGRAM_TOKEN: &str = "telegramToken";
    pub const AI_MODEL: &str = "aiModel";
    pub const INSTANCE_SIZE: &str = "instanceSize";
    pub const MONTHLY_BUDGET_LIMIT: &str = "monthlyBudgetLimit";
    pub const ENABLE_CONTENT_GUARDRAILS: &str = "enableContentGuardrails";
    pub const BUDGET_ALERT_EMAIL: &str = "budgetAlertEmail";
    pub const SCHEDULE_ENABLED: &str = "scheduleEnabled";
    pub const SHUTDOWN_HOUR: &str = "shutdownHour";
    pub const STARTUP_HOUR: &str = "startupHour";
    pub const WEEKEND_SHUTDOWN_ENABLED: &str = "weekendShutdownEnabled";
    pub const USE_SPOT_PRICING: &str = "useSpotPricing";
    pub const SPOT_MAX_HOURLY_PRICE: &str = "spotMaxHourlyPrice";
}

pub const EMAIL_PATTERN: &str = r"^$|^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Secret,
    Number,
    Integer,
    Bool,
    Enum,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub key: &'static str,
    pub aliases: Vec<&'static str>,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// `None` marks the parameter as required
    pub default: Option<&'static str>,
    pub constraint: Constraint,
    pub description: &'static str,
}

impl ParameterSpec {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Environment variable consulted for this parameter
    pub fn env_var(&self) -> String {
        let mut name = String::from(super::source::ENV_PREFIX);
        for (i, c) in self.key.chars().enumerate() {
            if c.is_ascii_uppercase() && i > 0 {
                name.push('_');
            }
            name.push(c.to_ascii_uppercase());
        }
        name
    }

    fn matches(&self, raw_key: &str) -> bool {
        self.key.eq_ignore_ascii_case(raw_key)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(raw_key))
    }
}

/// The full set of declared parameters, in presentation order
#[derive(Debug, Clone, Serialize)]
pub struct ParameterCatalog {
    parameters: Vec<ParameterSpec>,
}

impl ParameterCatalog {
    pub fn standard() -> Self {
        let bool_param = |key: &'static str, alias: &'static str, description: &'static str| ParameterSpec {
            key,
            aliases: vec![alias],
            param_type: ParamType::Bool,
            default: Some("false"),
            constraint: Constraint::Boolean,
            description,
        };

        let parameters = vec![
            ParameterSpec {
                key: keys::PRODUCT,
                aliases: vec!["Product"],
                param_type: ParamType::Enum,
                default: Some(Product::OpenClaw.value()),
                constraint: Constraint::AllowedValues {
                    values: Product::allowed_values(),
                    aliases: Product::aliases(),
                },
                description: "Gateway product to deploy",
            },
            ParameterSpec {
                key: keys::TELEGRAM_TOKEN,
                aliases: vec!["TelegramBotToken", "telegram_token"],
                param_type: ParamType::Secret,
                default: None,
                constraint: Constraint::Secret,
                description: "Telegram Bot Token (get from @BotFather)",
            },
            ParameterSpec {
                key: keys::AI_MODEL,
                aliases: vec!["BedrockModel", "model"],
                param_type: ParamType::Enum,
                default: Some(BedrockModel::default().value()),
                constraint: Constraint::AllowedValues {
                    values: BedrockModel::allowed_values(),
                    aliases: BedrockModel::aliases(),
                },
                description: "Bedrock model to use (Sonnet 4.5 recommended for cost)",
            },
            ParameterSpec {
                key: keys::INSTANCE_SIZE,
                aliases: vec!["InstanceType"],
                param_type: ParamType::Enum,
                default: Some(InstanceSize::default().value()),
                constraint: Constraint::AllowedValues {
                    values: InstanceSize::allowed_values(),
                    aliases: InstanceSize::aliases(),
                },
                description: "EC2 instance type (t3.micro = Free Tier eligible)",
            },
            ParameterSpec {
                key: keys::MONTHLY_BUDGET_LIMIT,
                aliases: vec!["MonthlyBudget"],
                param_type: ParamType::Number,
                default: Some("50"),
                constraint: Constraint::Range {
                    min: 10.0,
                    max: 500.0,
                },
                description: "Monthly budget limit in USD (alert at 80%)",
            },
            bool_param(
                keys::ENABLE_CONTENT_GUARDRAILS,
                "EnableGuardrails",
                "Enable Bedrock Guardrails for prompt injection protection (additional cost)",
            ),
            ParameterSpec {
                key: keys::BUDGET_ALERT_EMAIL,
                aliases: vec!["BudgetAlertEmail"],
                param_type: ParamType::String,
                default: Some(""),
                constraint: Constraint::Pattern {
                    pattern: EMAIL_PATTERN,
                    description: "a valid email address or empty",
                },
                description: "Email address for budget alerts (leave empty to skip notifications)",
            },
            bool_param(
                keys::SCHEDULE_ENABLED,
                "ScheduleEnabled",
                "Stop the instance nightly and start it in the morning",
            ),
            ParameterSpec {
                key: keys::SHUTDOWN_HOUR,
                aliases: vec!["ShutdownHour"],
                param_type: ParamType::Integer,
                default: Some("22"),
                constraint: Constraint::Range {
                    min: 0.0,
                    max: 23.0,
                },
                description: "Hour (UTC, 0-23) to shut down the instance",
            },
            ParameterSpec {
                key: keys::STARTUP_HOUR,
                aliases: vec!["StartupHour"],
                param_type: ParamType::Integer,
                default: Some("8"),
                constraint: Constraint::Range {
                    min: 0.0,
                    max: 23.0,
                },
                description: "Hour (UTC, 0-23) to start the instance",
            },
            bool_param(
                keys::WEEKEND_SHUTDOWN_ENABLED,
                "ShutdownWeekends",
                "Also stop the instance from Friday 18:00 to Monday 08:00",
            ),
            bool_param(
                keys::USE_SPOT_PRICING,
                "UseSpotInstances",
                "Use EC2 Spot pricing (cheaper, may be interrupted)",
            ),
            ParameterSpec {
                key: keys::SPOT_MAX_HOURLY_PRICE,
                aliases: vec!["SpotMaxPrice"],
                param_type: ParamType::Number,
                default: Some("0.005"),
                constraint: Constraint::Positive,
                description: "Maximum Spot price in USD per hour",
            },
        ];

        Self { parameters }
    }

    /// The standard catalog, built on first use
    pub fn shared() -> &'static ParameterCatalog {
        static SHARED: OnceLock<ParameterCatalog> = OnceLock::new();
        SHARED.get_or_init(Self::standard)
    }

    pub fn get(&self, key: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.key == key)
    }

    /// Resolves a key or alias (case-insensitive) to its canonical key
    pub fn canonical_key(&self, raw_key: &str) -> Option<&'static str> {
        let raw_key = raw_key.trim();
        self.parameters
            .iter()
            .find(|p| p.matches(raw_key))
            .map(|p| p.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
