use super::{POWER_CONTROL_FUNCTION, POWER_CONTROL_ROLE};
use crate::bootstrap::POWER_CONTROL_SOURCE;
use crate::config::{Feature, StackConfig};
use crate::error::ConstraintViolation;
use crate::graph::expr::{get_att, reference, sub};
use crate::graph::policy::POLICY_VERSION;
use crate::graph::{PermissionSet, PolicyStatement, ResourceGraph, ResourceKind, ResourceNode};
use crate::pipeline::stage::CompositionStage;
use crate::schedule::{PowerSchedule, ScheduledAction};
use serde_json::json;

pub const LAMBDA_RUNTIME: &str = "python3.11";
pub const LAMBDA_TIMEOUT_SECONDS: u32 = 30;

pub fn rule_id(action: &ScheduledAction) -> String {
    format!("{}Rule", action.name)
}

pub fn permission_id(action: &ScheduledAction) -> String {
    format!("{}Permission", action.name)
}

/// Power-control function and one timer rule per scheduled action
pub struct ScheduleStage;

impl CompositionStage for ScheduleStage {
    fn name(&self) -> &'static str {
        "schedule"
    }

    fn gate(&self) -> Option<Feature> {
        Some(Feature::PowerSchedule)
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        if !config.is_enabled(Feature::PowerSchedule) {
            return Err(ConstraintViolation::FeatureNotEnabled {
                feature: Feature::PowerSchedule,
            });
        }

        let instance = graph.single(ResourceKind::Compute)?.logical_id().to_string();
        let slug = config.product.slug();

        let permissions = PermissionSet::new(vec![PolicyStatement::allow(
            "InstancePowerControl",
            &[
                "ec2:StartInstances",
                "ec2:StopInstances",
                "ec2:DescribeInstances",
                "ec2:DescribeInstanceStatus",
            ],
            vec![sub(format!(
                "arn:${{AWS::Partition}}:ec2:${{AWS::Region}}:${{AWS::AccountId}}:instance/${{{}}}",
                instance
            ))],
        )]);
        let role = ResourceNode::new(
            POWER_CONTROL_ROLE,
            ResourceKind::ScheduleActionRole,
            "AWS::IAM::Role",
        )
        .property(
            "AssumeRolePolicyDocument",
            json!({
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" }
                }]
            }),
        )
        .property(
            "ManagedPolicyArns",
            json!([sub(
                "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
            )]),
        );
        let role = permissions.apply_to_role(&role);

        let function = ResourceNode::new(
            POWER_CONTROL_FUNCTION,
            ResourceKind::ScheduleAction,
            "AWS::Lambda::Function",
        )
        .property("Code", json!({ "ZipFile": POWER_CONTROL_SOURCE }))
        .property("Handler", json!("index.handler"))
        .property("Runtime", json!(LAMBDA_RUNTIME))
        .property("Role", get_att(POWER_CONTROL_ROLE, "Arn"))
        .property("Timeout", json!(LAMBDA_TIMEOUT_SECONDS))
        .property(
            "Environment",
            json!({ "Variables": { "INSTANCE_ID": reference(&instance) } }),
        )
        .depends_on(POWER_CONTROL_ROLE);

        let mut graph = graph.insert_all([role, function])?;

        for action in PowerSchedule::from_config(&config.schedule).actions() {
            let rule = ResourceNode::new(rule_id(action), ResourceKind::ScheduleRule, "AWS::Events::Rule")
                .property("Name", json!(format!("{}-{}", slug, action.rule_suffix)))
                .property("Description", json!(action.description))
                .property("ScheduleExpression", json!(action.cron_expression()))
                .property("State", json!("ENABLED"))
                .property(
                    "Targets",
                    json!([{
                        "Arn": get_att(POWER_CONTROL_FUNCTION, "Arn"),
                        "Id": "Target0",
                        "Input": json!({ "action": action.action.as_str() }).to_string(),
                    }]),
                );
            let permission = ResourceNode::new(
                permission_id(action),
                ResourceKind::SchedulePermission,
                "AWS::Lambda::Permission",
            )
            .property("Action", json!("lambda:InvokeFunction"))
            .property("FunctionName", get_att(POWER_CONTROL_FUNCTION, "Arn"))
            .property("Principal", json!("events.amazonaws.com"))
            .property("SourceArn", get_att(&rule_id(action), "Arn"));

            graph = graph.insert_all([rule, permission])?;
        }

        Ok(graph)
    }
}
