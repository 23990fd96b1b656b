use super::ids;
use crate::config::StackConfig;
use crate::error::ConstraintViolation;
use crate::graph::expr::sub;
use crate::graph::policy::POLICY_VERSION;
use crate::graph::{PermissionSet, PolicyStatement, ResourceGraph, ResourceKind, ResourceNode};
use crate::params::Product;
use crate::pipeline::stage::CompositionStage;
use serde_json::json;

pub const SSM_MANAGED_POLICY: &str = "arn:${AWS::Partition}:iam::aws:policy/AmazonSSMManagedInstanceCore";

/// Statements every gateway role carries, whatever features are enabled
pub fn base_permissions(product: Product) -> PermissionSet {
    let slug = product.slug();
    PermissionSet::new(vec![
        PolicyStatement::allow(
            "BedrockInvokeAnthropicModels",
            &["bedrock:InvokeModel", "bedrock:InvokeModelWithResponseStream"],
            vec![sub("arn:${AWS::Partition}:bedrock:*::foundation-model/anthropic.*")],
        ),
        PolicyStatement::allow(
            "SSMParameterReadOnly",
            &["ssm:GetParameter", "ssm:GetParameters"],
            vec![sub(format!(
                "arn:${{AWS::Partition}}:ssm:${{AWS::Region}}:${{AWS::AccountId}}:parameter/{}/*",
                slug
            ))],
        ),
        PolicyStatement::allow(
            "CloudWatchLogsWrite",
            &[
                "logs:CreateLogGroup",
                "logs:CreateLogStream",
                "logs:PutLogEvents",
                "logs:DescribeLogStreams",
            ],
            vec![sub(format!(
                "arn:${{AWS::Partition}}:logs:${{AWS::Region}}:${{AWS::AccountId}}:log-group:/{}/*",
                slug
            ))],
        ),
        PolicyStatement::allow("CloudWatchMetricsWrite", &["cloudwatch:PutMetricData"], vec![json!("*")])
            .with_condition(json!({
                "StringEquals": { "cloudwatch:namespace": product.name() }
            })),
    ])
}

/// Instance role with least-privilege inline permissions
pub struct IdentityStage;

impl CompositionStage for IdentityStage {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        let display = config.product.name();
        let role = ResourceNode::new(
            ids(config).instance_role(),
            ResourceKind::Identity,
            "AWS::IAM::Role",
        )
        .property(
            "AssumeRolePolicyDocument",
            json!({
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "ec2.amazonaws.com" }
                }]
            }),
        )
        .property(
            "Description",
            json!(format!(
                "IAM role for {} EC2 instance - Bedrock + SSM + CloudWatch",
                display
            )),
        )
        .property("ManagedPolicyArns", json!([sub(SSM_MANAGED_POLICY)]))
        .property("RoleName", json!(format!("{}GatewayRole", display)))
        .property("Tags", super::tag_list(config, &[]));

        let role = base_permissions(config.product).apply_to_role(&role);
        graph.insert(role)
    }
}
