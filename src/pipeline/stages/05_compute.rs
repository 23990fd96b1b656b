use super::{
    ids, tag_list, AMI_PARAMETER, GUARDRAIL_ID_SSM_PARAMETER, GUARDRAIL_VERSION_SSM_PARAMETER,
    MODEL_SSM_PARAMETER, TOKEN_SSM_PARAMETER,
};
use crate::bootstrap::BootstrapPayload;
use crate::config::{Feature, StackConfig};
use crate::error::ConstraintViolation;
use crate::graph::expr::{first_availability_zone, get_att, reference};
use crate::graph::{ResourceGraph, ResourceKind, ResourceNode};
use crate::pipeline::stage::CompositionStage;
use serde_json::json;

pub const ROOT_VOLUME_GIB: u32 = 8;
pub const ROOT_DEVICE: &str = "/dev/xvda";

/// Instance profile, launch template and the gateway instance
pub struct ComputeStage;

impl CompositionStage for ComputeStage {
    fn name(&self) -> &'static str {
        "compute"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        let ids = ids(config);
        let slug = config.product.slug();
        let role = graph.single(ResourceKind::Identity)?.logical_id().to_string();
        let guardrails = config.is_enabled(Feature::ContentGuardrails);
        let payload = BootstrapPayload::render(config.product, guardrails)?;

        let profile = ResourceNode::new(
            ids.instance_profile(),
            ResourceKind::InstanceProfile,
            "AWS::IAM::InstanceProfile",
        )
        .property("Roles", json!([reference(&role)]));

        let launch_template = ResourceNode::new(
            ids.launch_template(),
            ResourceKind::LaunchTemplate,
            "AWS::EC2::LaunchTemplate",
        )
        .property(
            "LaunchTemplateName",
            json!(format!("{}-gateway-launch-template", slug)),
        )
        .property(
            "LaunchTemplateData",
            json!({
                "MetadataOptions": {
                    "HttpEndpoint": "enabled",
                    "HttpTokens": "required"
                }
            }),
        );

        let mut instance = ResourceNode::new(ids.instance(), ResourceKind::Compute, "AWS::EC2::Instance")
            .property("AvailabilityZone", first_availability_zone())
            .property("ImageId", reference(AMI_PARAMETER))
            .property("InstanceType", json!(config.instance_size.value()))
            .property("IamInstanceProfile", reference(&ids.instance_profile()))
            .property(
                "LaunchTemplate",
                json!({
                    "LaunchTemplateId": reference(&ids.launch_template()),
                    "Version": get_att(&ids.launch_template(), "LatestVersionNumber"),
                }),
            )
            .property(
                "SecurityGroupIds",
                json!([get_att(&ids.security_group(), "GroupId")]),
            )
            .property("SubnetId", reference(&ids.subnet()))
            .property(
                "BlockDeviceMappings",
                json!([{
                    "DeviceName": ROOT_DEVICE,
                    "Ebs": {
                        "DeleteOnTermination": true,
                        "Encrypted": true,
                        "VolumeSize": ROOT_VOLUME_GIB,
                        "VolumeType": "gp3"
                    }
                }]),
            )
            .property("UserData", payload.to_user_data())
            .property(
                "Tags",
                tag_list(config, &[("Name", &format!("{}-gateway", slug))]),
            )
            .depends_on(role)
            .depends_on(TOKEN_SSM_PARAMETER)
            .depends_on(MODEL_SSM_PARAMETER);
        // The boot script reads these under `set -e`
        if guardrails {
            instance = instance
                .depends_on(GUARDRAIL_ID_SSM_PARAMETER)
                .depends_on(GUARDRAIL_VERSION_SSM_PARAMETER);
        }

        graph.insert_all([profile, launch_template, instance])
    }
}
