use super::{tag_map, AMI_PARAMETER, MODEL_SSM_PARAMETER, TOKEN_PARAMETER, TOKEN_SSM_PARAMETER};
use crate::bootstrap::{parameter_path, parameters};
use crate::config::StackConfig;
use crate::error::ConstraintViolation;
use crate::graph::expr::reference;
use crate::graph::{ResourceGraph, ResourceKind, ResourceNode, TemplateParameter};
use crate::pipeline::stage::CompositionStage;
use serde_json::json;

pub const AMI_SSM_PATH: &str = "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64";

/// Template parameters and the SSM entries the instance reads at boot
///
/// The token only ever enters the template as a `NoEcho` parameter
/// reference; its value is supplied at deploy time.
pub struct SecretsStage;

impl CompositionStage for SecretsStage {
    fn name(&self) -> &'static str {
        "secrets"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        let product = config.product;
        let display = product.name();

        let graph = graph
            .declare_parameter(TemplateParameter {
                name: TOKEN_PARAMETER.to_string(),
                param_type: "String".to_string(),
                no_echo: true,
                description: "Telegram Bot Token from @BotFather (will be stored encrypted in SSM)"
                    .to_string(),
                default: None,
            })?
            .declare_parameter(TemplateParameter {
                name: AMI_PARAMETER.to_string(),
                param_type: "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>".to_string(),
                no_echo: false,
                description: "Latest Amazon Linux 2023 AMI (x86_64)".to_string(),
                default: Some(AMI_SSM_PATH.to_string()),
            })?;

        let token = ResourceNode::new(TOKEN_SSM_PARAMETER, ResourceKind::Secret, "AWS::SSM::Parameter")
            .property(
                "Name",
                json!(parameter_path(product, parameters::TELEGRAM_TOKEN)),
            )
            .property("Type", json!("SecureString"))
            .property("Value", reference(TOKEN_PARAMETER))
            .property(
                "Description",
                json!(format!("Telegram Bot Token for {} (KMS encrypted)", display)),
            )
            .property("Tier", json!("Standard"))
            .property("Tags", tag_map(config, &[]));

        let model = ResourceNode::new(MODEL_SSM_PARAMETER, ResourceKind::Secret, "AWS::SSM::Parameter")
            .property(
                "Name",
                json!(parameter_path(product, parameters::BEDROCK_MODEL)),
            )
            .property("Type", json!("String"))
            .property("Value", json!(config.ai_model.value()))
            .property("Description", json!("Bedrock model identifier"))
            .property("Tier", json!("Standard"))
            .property("Tags", tag_map(config, &[]));

        graph.insert_all([token, model])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply() -> ResourceGraph {
        let config = StackConfig::from_pairs([
            ("telegramToken", "123456:secret-value"),
            ("product", "clawdbot"),
            ("aiModel", "anthropic.claude-opus-4-5-v2"),
        ])
        .unwrap();
        SecretsStage.apply(ResourceGraph::new(), &config).unwrap()
    }

    #[test]
    fn test_token_is_parameter_reference() {
        let graph = apply();
        let token = graph.get(TOKEN_SSM_PARAMETER).unwrap();
        assert_eq!(token.get_property("Value"), Some(&reference(TOKEN_PARAMETER)));
        assert_eq!(token.get_property("Type"), Some(&json!("SecureString")));
        assert_eq!(
            token.get_property("Name"),
            Some(&json!("/clawdbot/telegram-token"))
        );
        let rendered = serde_json::to_string(&token.to_template()).unwrap();
        assert!(!rendered.contains("secret-value"));
    }

    #[test]
    fn test_token_parameter_is_no_echo() {
        let graph = apply();
        let param = graph
            .parameters()
            .iter()
            .find(|p| p.name == TOKEN_PARAMETER)
            .unwrap();
        assert!(param.no_echo);
        assert!(param.default.is_none());
    }

    #[test]
    fn test_model_value() {
        let graph = apply();
        assert_eq!(
            graph.get(MODEL_SSM_PARAMETER).unwrap().get_property("Value"),
            Some(&json!("anthropic.claude-opus-4-5-v2"))
        );
    }
}
