//! Deployable CloudFormation document
//!
//! Built from a composed graph and its outputs. Keys are ordered, so equal
//! inputs always serialize to identical bytes.

use crate::config::StackConfig;
use crate::error::SynthError;
use crate::graph::ResourceGraph;
use crate::pipeline::outputs::StackOutput;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

pub const FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for TemplateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown template format '{}'", other)),
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    document: Value,
}

impl Template {
    pub fn new(config: &StackConfig, graph: &ResourceGraph, outputs: &[StackOutput]) -> Self {
        let parameters: Map<String, Value> = graph
            .parameters()
            .iter()
            .map(|p| (p.name.clone(), json!(p)))
            .collect();
        let resources: Map<String, Value> = graph
            .nodes()
            .iter()
            .map(|n| (n.logical_id().to_string(), n.to_template()))
            .collect();
        let outputs: Map<String, Value> = outputs
            .iter()
            .map(|o| (o.name.to_string(), o.to_template()))
            .collect();

        Self {
            document: json!({
                "AWSTemplateFormatVersion": FORMAT_VERSION,
                "Description": description(config),
                "Parameters": parameters,
                "Resources": resources,
                "Outputs": outputs,
            }),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.document.get("Resources")?.get(logical_id)
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.document.get("Outputs")?.get(name)
    }

    pub fn to_json(&self) -> Result<String, SynthError> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    pub fn to_yaml(&self) -> Result<String, SynthError> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    pub fn render(&self, format: TemplateFormat) -> Result<String, SynthError> {
        match format {
            TemplateFormat::Json => self.to_json(),
            TemplateFormat::Yaml => self.to_yaml(),
        }
    }
}

fn description(config: &StackConfig) -> String {
    format!(
        "{} AI Gateway - Telegram bot on Amazon Bedrock with zero inbound ports",
        config.product.name()
    )
}
