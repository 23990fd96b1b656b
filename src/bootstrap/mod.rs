//! First-boot payload for the gateway instance
//!
//! The script is kept as a templated asset and filled in per product. It is
//! embedded as `Fn::Base64(Fn::Sub(...))`, so `${AWS::Region}` resolves at
//! deploy time; the asset must contain no other `${...}` tokens.

use crate::error::ConstraintViolation;
use crate::graph::expr::{base64, sub};
use crate::params::Product;
use serde_json::Value;

const BOOTSTRAP_TEMPLATE: &str = include_str!("../../assets/bootstrap.sh");
const GUARDRAIL_LOOKUP_TEMPLATE: &str = include_str!("../../assets/guardrail_lookup.sh");

/// Source of the power-control Lambda handler
pub const POWER_CONTROL_SOURCE: &str = include_str!("../../assets/power_control.py");

const GUARDRAIL_CONFIG: &str = ",\n    \"guardrail\": {\n      \"id\": \"$GUARDRAIL_ID\",\n      \"version\": \"$GUARDRAIL_VERSION\"\n    }";

/// SSM parameter names the payload reads, relative to `/<app>/`
pub mod parameters {
    pub const TELEGRAM_TOKEN: &str = "telegram-token";
    pub const BEDROCK_MODEL: &str = "bedrock-model";
    pub const GUARDRAIL_ID: &str = "guardrail-id";
    pub const GUARDRAIL_VERSION: &str = "guardrail-version";
}

/// Full SSM path of one of the payload's parameters
pub fn parameter_path(product: Product, name: &str) -> String {
    format!("/{}/{}", product.slug(), name)
}

/// Local log written by the payload
pub fn log_path(product: Product) -> String {
    format!("/var/log/{}-bootstrap.log", product.slug())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPayload {
    script: String,
}

impl BootstrapPayload {
    pub fn render(product: Product, guardrails: bool) -> Result<Self, ConstraintViolation> {
        let (lookup, config) = if guardrails {
            (
                fill("guardrail_lookup.sh", GUARDRAIL_LOOKUP_TEMPLATE, product, &[])?,
                GUARDRAIL_CONFIG.to_string(),
            )
        } else {
            (String::new(), String::new())
        };
        let script = fill(
            "bootstrap.sh",
            BOOTSTRAP_TEMPLATE,
            product,
            &[("guardrail_lookup", &lookup), ("guardrail_config", &config)],
        )?;
        Ok(Self { script })
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    /// Whether the script fetches the SSM parameter at `path`
    pub fn reads_parameter(&self, path: &str) -> bool {
        self.script.contains(&format!("--name {} ", path))
            || self.script.contains(&format!("--name {}\n", path))
    }

    /// `UserData` value for a launch configuration
    pub fn to_user_data(&self) -> Value {
        base64(sub(self.script.clone()))
    }
}

fn fill(
    asset: &'static str,
    template: &str,
    product: Product,
    extra: &[(&str, &str)],
) -> Result<String, ConstraintViolation> {
    let mut out = template
        .replace("{{app}}", product.slug())
        .replace("{{display}}", product.name())
        .replace("{{package}}", product.npm_package());
    for (name, value) in extra {
        out = out.replace(&format!("{{{{{}}}}}", name), value);
    }
    if let Some(start) = out.find("{{") {
        let placeholder = out[start..]
            .split("}}")
            .next()
            .map(|p| format!("{}}}}}", p))
            .unwrap_or_default();
        return Err(ConstraintViolation::UnresolvedPlaceholder { asset, placeholder });
    }
    Ok(out)
}
