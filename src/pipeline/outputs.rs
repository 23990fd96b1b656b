//! Stack outputs derived from the final graph

use super::stages::{ids, log_group_name, POWER_CONTROL_FUNCTION, TOKEN_SSM_PARAMETER};
use crate::bootstrap::log_path;
use crate::config::{Feature, StackConfig};
use crate::error::ConstraintViolation;
use crate::estimate::CostEstimate;
use crate::graph::expr::{collect_references, get_att, reference, sub};
use crate::graph::ResourceGraph;
use crate::schedule::PowerSchedule;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct StackOutput {
    pub name: &'static str,
    pub description: String,
    pub value: Value,
    pub export_name: Option<String>,
}

impl StackOutput {
    fn new(name: &'static str, description: impl Into<String>, value: Value) -> Self {
        Self {
            name,
            description: description.into(),
            value,
            export_name: None,
        }
    }

    fn exported(mut self, config: &StackConfig) -> Self {
        self.export_name = Some(format!("{}{}", config.product.name(), self.name));
        self
    }

    pub fn to_template(&self) -> Value {
        let mut out = Map::new();
        out.insert("Description".to_string(), json!(self.description));
        out.insert("Value".to_string(), self.value.clone());
        if let Some(export) = &self.export_name {
            out.insert("Export".to_string(), json!({ "Name": export }));
        }
        Value::Object(out)
    }
}

/// Outputs for `graph`, which must be the fully composed graph for `config`
pub fn derive(
    graph: &ResourceGraph,
    config: &StackConfig,
) -> Result<Vec<StackOutput>, ConstraintViolation> {
    let ids = ids(config);
    let slug = config.product.slug();
    let instance = ids.instance();
    let session = format!(
        "aws ssm start-session --target ${{{}}} --region ${{AWS::Region}}",
        instance
    );
    let estimate = CostEstimate::for_config(config);

    let mut outputs = vec![
        StackOutput::new("InstanceId", "EC2 Instance ID", reference(&instance)).exported(config),
        StackOutput::new(
            "InstancePublicIp",
            "Public IP (for reference only - SSH disabled)",
            get_att(&instance, "PublicIp"),
        )
        .exported(config),
        StackOutput::new(
            "ConnectCommand",
            "Command to connect via Session Manager (no SSH needed)",
            sub(session.clone()),
        )
        .exported(config),
        StackOutput::new(
            "LogsCommand",
            "Command to view live logs",
            sub(format!(
                "aws logs tail {} --follow --region ${{AWS::Region}}",
                log_group_name(config)
            )),
        )
        .exported(config),
        StackOutput::new(
            "ServiceStatusCommand",
            format!("Command to check {} service status", config.product.name()),
            sub(format!("{} && sudo systemctl status {}", session, slug)),
        )
        .exported(config),
        StackOutput::new(
            "TelegramTokenParameterArn",
            "SSM Parameter ARN for Telegram token (KMS encrypted)",
            sub(format!(
                "arn:${{AWS::Partition}}:ssm:${{AWS::Region}}:${{AWS::AccountId}}:parameter${{{}}}",
                TOKEN_SSM_PARAMETER
            )),
        )
        .exported(config),
        StackOutput::new(
            "SecurityGroupId",
            "Security Group ID (zero inbound rules)",
            get_att(&ids.security_group(), "GroupId"),
        )
        .exported(config),
        StackOutput::new(
            "DeploymentNotes",
            "Post-deployment steps",
            json!([
                "Deployment complete!".to_string(),
                "1. Connect: Use Session Manager (see ConnectCommand output)".to_string(),
                format!("2. Logs: Check {} for setup", log_path(config.product)),
                format!("3. Status: Run systemctl status {}", slug),
                "4. Security: Zero inbound ports, KMS-encrypted secrets".to_string(),
                "5. Cost: Monitor via AWS Budgets (alert at 80%)".to_string(),
            ]
            .join(" | ")),
        ),
        StackOutput::new(
            "EstimatedMonthlyCost",
            "Estimated monthly EC2 cost",
            json!(estimate.summary()),
        ),
        StackOutput::new(
            "SpotInstanceEnabled",
            "Whether the instance runs on spot capacity",
            json!(config.is_enabled(Feature::SpotPricing).to_string()),
        ),
    ];

    if config.is_enabled(Feature::ContentGuardrails) {
        outputs.push(
            StackOutput::new(
                "GuardrailId",
                "Bedrock Guardrail ID",
                get_att(&ids.guardrail(), "GuardrailId"),
            )
            .exported(config),
        );
    }

    if config.is_enabled(Feature::PowerSchedule) {
        outputs.push(StackOutput::new(
            "ShutdownSchedule",
            "Instance power schedule",
            json!(PowerSchedule::from_config(&config.schedule).to_string()),
        ));
        outputs.push(
            StackOutput::new(
                "PowerControlFunctionArn",
                "Lambda function controlling instance power",
                get_att(POWER_CONTROL_FUNCTION, "Arn"),
            )
            .exported(config),
        );
    }

    for output in &outputs {
        let mut refs = BTreeSet::new();
        collect_references(&output.value, &mut refs);
        if let Some(missing) = refs.into_iter().find(|r| graph.get(r).is_none()) {
            return Err(ConstraintViolation::DanglingReference {
                node: output.name.to_string(),
                reference: missing,
            });
        }
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ResourceKind, ResourceNode};

    fn minimal_graph() -> ResourceGraph {
        ResourceGraph::new()
            .insert_all([
                ResourceNode::new("OpenClawSecurityGroup", ResourceKind::Firewall, "AWS::EC2::SecurityGroup"),
                ResourceNode::new(TOKEN_SSM_PARAMETER, ResourceKind::Secret, "AWS::SSM::Parameter"),
                ResourceNode::new("OpenClawInstance", ResourceKind::Compute, "AWS::EC2::Instance"),
            ])
            .unwrap()
    }

    fn config(pairs: &[(&str, &str)]) -> StackConfig {
        let mut all = vec![("telegramToken", "1:a")];
        all.extend_from_slice(pairs);
        StackConfig::from_pairs(all).unwrap()
    }

    #[test]
    fn test_base_outputs() {
        let outputs = derive(&minimal_graph(), &config(&[])).unwrap();
        let names: Vec<_> = outputs.iter().map(|o| o.name).collect();
        assert_eq!(
            names,
            vec![
                "InstanceId",
                "InstancePublicIp",
                "ConnectCommand",
                "LogsCommand",
                "ServiceStatusCommand",
                "TelegramTokenParameterArn",
                "SecurityGroupId",
                "DeploymentNotes",
                "EstimatedMonthlyCost",
                "SpotInstanceEnabled"
            ]
        );
        assert_eq!(outputs[0].export_name.as_deref(), Some("OpenClawInstanceId"));
        assert!(outputs[7].export_name.is_none());
    }

    #[test]
    fn test_estimate_output() {
        let outputs = derive(&minimal_graph(), &config(&[])).unwrap();
        let cost = outputs.iter().find(|o| o.name == "EstimatedMonthlyCost").unwrap();
        assert_eq!(
            cost.value,
            json!("$7.59/month (EC2, t3.micro on-demand, 730 active hours)")
        );
    }

    #[test]
    fn test_feature_outputs_need_their_nodes() {
        let err = derive(
            &minimal_graph(),
            &config(&[("enableContentGuardrails", "true")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConstraintViolation::DanglingReference {
                node: "GuardrailId".to_string(),
                reference: "OpenClawGuardrail".to_string()
            }
        );
    }

    #[test]
    fn test_to_template() {
        let output = StackOutput::new("InstanceId", "EC2 Instance ID", reference("X"))
            .exported(&config(&[("product", "moltbot")]));
        assert_eq!(
            output.to_template(),
            json!({
                "Description": "EC2 Instance ID",
                "Value": { "Ref": "X" },
                "Export": { "Name": "MoltbotInstanceId" }
            })
        );
    }
}
