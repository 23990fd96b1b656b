use crate::config::{Feature, StackConfig};
use crate::error::ConstraintViolation;
use crate::graph::{ResourceGraph, ResourceKind};
use crate::pipeline::stage::CompositionStage;
use serde_json::{json, Value};
use tracing::debug;

/// Switches the launch template to persistent spot capacity
pub struct SpotStage;

impl CompositionStage for SpotStage {
    fn name(&self) -> &'static str {
        "spot"
    }

    fn gate(&self) -> Option<Feature> {
        Some(Feature::SpotPricing)
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        if !config.is_enabled(Feature::SpotPricing) {
            return Err(ConstraintViolation::FeatureNotEnabled {
                feature: Feature::SpotPricing,
            });
        }

        let template = graph.single(ResourceKind::LaunchTemplate)?;
        let mut data = template
            .get_property("LaunchTemplateData")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ConstraintViolation::MalformedProperty {
                id: template.logical_id().to_string(),
                property: "LaunchTemplateData",
            })?;
        data.insert(
            "InstanceMarketOptions".to_string(),
            json!({
                "MarketType": "spot",
                "SpotOptions": {
                    "InstanceInterruptionBehavior": "stop",
                    "MaxPrice": format!("{}", config.spot.max_hourly_price),
                    "SpotInstanceType": "persistent"
                }
            }),
        );
        let updated = template.with_property("LaunchTemplateData", Value::Object(data));
        debug!(
            template = updated.logical_id(),
            max_price = config.spot.max_hourly_price,
            "Requesting spot capacity"
        );
        graph.supersede(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceNode;

    fn config() -> StackConfig {
        StackConfig::from_pairs([
            ("telegramToken", "1:a"),
            ("useSpotPricing", "true"),
            ("spotMaxHourlyPrice", "0.004"),
        ])
        .unwrap()
    }

    fn graph() -> ResourceGraph {
        let template = ResourceNode::new(
            "OpenClawLaunchTemplate",
            ResourceKind::LaunchTemplate,
            "AWS::EC2::LaunchTemplate",
        )
        .property(
            "LaunchTemplateData",
            json!({ "MetadataOptions": { "HttpTokens": "required" } }),
        );
        let instance = ResourceNode::new("OpenClawInstance", ResourceKind::Compute, "AWS::EC2::Instance")
            .property(
                "LaunchTemplate",
                json!({ "LaunchTemplateId": { "Ref": "OpenClawLaunchTemplate" } }),
            );
        ResourceGraph::new().insert_all([template, instance]).unwrap()
    }

    #[test]
    fn test_superseded_in_place() {
        let graph = SpotStage.apply(graph(), &config()).unwrap();
        assert_eq!(graph.position("OpenClawLaunchTemplate"), Some(0));
        let data = graph
            .single(ResourceKind::LaunchTemplate)
            .unwrap()
            .get_property("LaunchTemplateData")
            .unwrap()
            .clone();
        assert_eq!(data["MetadataOptions"]["HttpTokens"], "required");
        assert_eq!(data["InstanceMarketOptions"]["MarketType"], "spot");
        assert_eq!(data["InstanceMarketOptions"]["SpotOptions"]["MaxPrice"], "0.004");
        assert_eq!(
            data["InstanceMarketOptions"]["SpotOptions"]["SpotInstanceType"],
            "persistent"
        );
    }

    #[test]
    fn test_template_without_data_is_rejected() {
        let template = ResourceNode::new(
            "OpenClawLaunchTemplate",
            ResourceKind::LaunchTemplate,
            "AWS::EC2::LaunchTemplate",
        );
        let graph = ResourceGraph::new().insert(template).unwrap();
        assert_eq!(
            SpotStage.apply(graph, &config()).unwrap_err(),
            ConstraintViolation::MalformedProperty {
                id: "OpenClawLaunchTemplate".to_string(),
                property: "LaunchTemplateData",
            }
        );
    }

    #[test]
    fn test_refuses_when_disabled() {
        let config = StackConfig::from_pairs([("telegramToken", "1:a")]).unwrap();
        assert!(matches!(
            SpotStage.apply(graph(), &config),
            Err(ConstraintViolation::FeatureNotEnabled { .. })
        ));
    }
}
