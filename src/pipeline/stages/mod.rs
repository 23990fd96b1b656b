//! Composition stages, in the order the composer applies them
//!
//! The numeric file prefixes mirror the fixed application order. New
//! optional features go at the end so they can build on everything before
//! them.

use crate::config::StackConfig;
use crate::params::Product;
use serde_json::{json, Map, Value};

#[path = "01_network.rs"]
pub mod network;
#[path = "02_identity.rs"]
pub mod identity;
#[path = "03_secrets.rs"]
pub mod secrets;
#[path = "04_guardrails.rs"]
pub mod guardrails;
#[path = "05_compute.rs"]
pub mod compute;
#[path = "06_monitoring.rs"]
pub mod monitoring;
#[path = "07_budget.rs"]
pub mod budget;
#[path = "08_schedule.rs"]
pub mod schedule;
#[path = "09_spot.rs"]
pub mod spot;

pub use budget::BudgetStage;
pub use compute::ComputeStage;
pub use guardrails::GuardrailStage;
pub use identity::IdentityStage;
pub use monitoring::{log_group_name, MonitoringStage};
pub use network::NetworkStage;
pub use schedule::ScheduleStage;
pub use secrets::SecretsStage;
pub use spot::SpotStage;

pub const TOKEN_PARAMETER: &str = "TelegramBotToken";
pub const AMI_PARAMETER: &str = "LatestAmiId";
pub const TOKEN_SSM_PARAMETER: &str = "TelegramTokenParameter";
pub const MODEL_SSM_PARAMETER: &str = "BedrockModelParameter";
pub const GUARDRAIL_ID_SSM_PARAMETER: &str = "GuardrailIdParameter";
pub const GUARDRAIL_VERSION_SSM_PARAMETER: &str = "GuardrailVersionParameter";
pub const HEALTH_ALARM: &str = "InstanceHealthAlarm";
pub const CPU_ALARM: &str = "CPUUtilizationAlarm";
pub const POWER_CONTROL_ROLE: &str = "PowerControlRole";
pub const POWER_CONTROL_FUNCTION: &str = "PowerControlFunction";

/// Logical ids that carry the product's display name as prefix
#[derive(Debug, Clone, Copy)]
pub struct LogicalIds {
    product: Product,
}

impl LogicalIds {
    pub fn new(product: Product) -> Self {
        Self { product }
    }

    fn prefixed(&self, suffix: &str) -> String {
        format!("{}{}", self.product.name(), suffix)
    }

    pub fn vpc(&self) -> String {
        self.prefixed("VPC")
    }

    pub fn internet_gateway(&self) -> String {
        self.prefixed("InternetGateway")
    }

    pub fn gateway_attachment(&self) -> String {
        self.prefixed("GatewayAttachment")
    }

    pub fn subnet(&self) -> String {
        self.prefixed("PublicSubnet")
    }

    pub fn route_table(&self) -> String {
        self.prefixed("PublicRouteTable")
    }

    pub fn route_table_association(&self) -> String {
        self.prefixed("PublicRouteTableAssociation")
    }

    pub fn default_route(&self) -> String {
        self.prefixed("PublicDefaultRoute")
    }

    pub fn security_group(&self) -> String {
        self.prefixed("SecurityGroup")
    }

    pub fn instance_role(&self) -> String {
        self.prefixed("InstanceRole")
    }

    pub fn guardrail(&self) -> String {
        self.prefixed("Guardrail")
    }

    pub fn instance_profile(&self) -> String {
        self.prefixed("InstanceProfile")
    }

    pub fn launch_template(&self) -> String {
        self.prefixed("LaunchTemplate")
    }

    pub fn instance(&self) -> String {
        self.prefixed("Instance")
    }

    pub fn budget(&self) -> String {
        self.prefixed("Budget")
    }

    pub fn log_group(&self) -> String {
        self.prefixed("LogGroup")
    }
}

pub fn ids(config: &StackConfig) -> LogicalIds {
    LogicalIds::new(config.product)
}

/// Tags applied to every taggable resource of the stack
pub fn stack_tags(config: &StackConfig) -> Vec<(&'static str, String)> {
    let display = config.product.name();
    vec![
        ("Application", display.to_string()),
        ("CostCenter", "AI-Assistant".to_string()),
        ("Environment", "Production".to_string()),
        ("ManagedBy", "clawstack".to_string()),
        ("Project", display.to_string()),
    ]
}

fn merged_tags(config: &StackConfig, extra: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut tags: Vec<(String, String)> = stack_tags(config)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    for (key, value) in extra {
        match tags.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => tags.push((key.to_string(), value.to_string())),
        }
    }
    tags.sort();
    tags
}

/// `[{"Key": .., "Value": ..}]` form used by most resource types
pub fn tag_list(config: &StackConfig, extra: &[(&str, &str)]) -> Value {
    Value::Array(
        merged_tags(config, extra)
            .into_iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect(),
    )
}

/// `{"Key": "Value"}` form used by SSM parameters
pub fn tag_map(config: &StackConfig, extra: &[(&str, &str)]) -> Value {
    Value::Object(
        merged_tags(config, extra)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<String, Value>>(),
    )
}
