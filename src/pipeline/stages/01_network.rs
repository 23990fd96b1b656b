use super::{ids, tag_list};
use crate::config::StackConfig;
use crate::error::ConstraintViolation;
use crate::graph::expr::{first_availability_zone, get_att, reference};
use crate::graph::{ResourceGraph, ResourceKind, ResourceNode};
use crate::params::EgressPolicy;
use crate::pipeline::stage::CompositionStage;
use serde_json::{json, Value};

pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const SUBNET_CIDR: &str = "10.0.0.0/24";

/// Single-AZ public network with no NAT gateway and a zero-inbound firewall
pub struct NetworkStage;

impl CompositionStage for NetworkStage {
    fn name(&self) -> &'static str {
        "network"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        let ids = ids(config);
        let slug = config.product.slug();

        let vpc = ResourceNode::new(ids.vpc(), ResourceKind::Network, "AWS::EC2::VPC")
            .property("CidrBlock", json!(VPC_CIDR))
            .property("EnableDnsHostnames", json!(true))
            .property("EnableDnsSupport", json!(true))
            .property("InstanceTenancy", json!("default"))
            .property("Tags", tag_list(config, &[("Name", &format!("{}-vpc", slug))]));

        let internet_gateway = ResourceNode::new(
            ids.internet_gateway(),
            ResourceKind::Routing,
            "AWS::EC2::InternetGateway",
        )
        .property("Tags", tag_list(config, &[("Name", &format!("{}-igw", slug))]));

        let attachment = ResourceNode::new(
            ids.gateway_attachment(),
            ResourceKind::Routing,
            "AWS::EC2::VPCGatewayAttachment",
        )
        .property("VpcId", reference(&ids.vpc()))
        .property("InternetGatewayId", reference(&ids.internet_gateway()));

        let subnet = ResourceNode::new(ids.subnet(), ResourceKind::Subnet, "AWS::EC2::Subnet")
            .property("VpcId", reference(&ids.vpc()))
            .property("CidrBlock", json!(SUBNET_CIDR))
            .property("AvailabilityZone", first_availability_zone())
            .property("MapPublicIpOnLaunch", json!(true))
            .property(
                "Tags",
                tag_list(config, &[("Name", &format!("{}-public", slug))]),
            );

        let route_table = ResourceNode::new(
            ids.route_table(),
            ResourceKind::Routing,
            "AWS::EC2::RouteTable",
        )
        .property("VpcId", reference(&ids.vpc()))
        .property("Tags", tag_list(config, &[]));

        let association = ResourceNode::new(
            ids.route_table_association(),
            ResourceKind::Routing,
            "AWS::EC2::SubnetRouteTableAssociation",
        )
        .property("RouteTableId", reference(&ids.route_table()))
        .property("SubnetId", reference(&ids.subnet()));

        let default_route = ResourceNode::new(
            ids.default_route(),
            ResourceKind::Routing,
            "AWS::EC2::Route",
        )
        .property("RouteTableId", reference(&ids.route_table()))
        .property("DestinationCidrBlock", json!("0.0.0.0/0"))
        .property("GatewayId", reference(&ids.internet_gateway()))
        .depends_on(ids.gateway_attachment());

        let security_group = ResourceNode::new(
            ids.security_group(),
            ResourceKind::Firewall,
            "AWS::EC2::SecurityGroup",
        )
        .property(
            "GroupDescription",
            json!(format!(
                "{} Gateway - Zero inbound traffic (polling model)",
                config.product.name()
            )),
        )
        .property("GroupName", json!(format!("{}-gateway-sg", slug)))
        .property("VpcId", get_att(&ids.vpc(), "VpcId"))
        .property("SecurityGroupEgress", egress_rules(config.product.egress_policy()))
        .property(
            "Tags",
            tag_list(config, &[("SecurityPosture", "Zero-Inbound")]),
        );

        graph.insert_all([
            vpc,
            internet_gateway,
            attachment,
            subnet,
            route_table,
            association,
            default_route,
            security_group,
        ])
    }
}

fn egress_rules(policy: EgressPolicy) -> Value {
    match policy {
        EgressPolicy::AllowAll => json!([{
            "CidrIp": "0.0.0.0/0",
            "Description": "Allow all outbound traffic by default",
            "IpProtocol": "-1"
        }]),
        EgressPolicy::HttpsOnly => json!([{
            "CidrIp": "0.0.0.0/0",
            "Description": "HTTPS outbound for Telegram API, Bedrock, SSM, CloudWatch",
            "FromPort": 443,
            "IpProtocol": "tcp",
            "ToPort": 443
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(product: &str) -> ResourceGraph {
        let config =
            StackConfig::from_pairs([("telegramToken", "1:a"), ("product", product)]).unwrap();
        NetworkStage.apply(ResourceGraph::new(), &config).unwrap()
    }

    #[test]
    fn test_single_network_and_subnet() {
        let graph = apply("openclaw");
        assert_eq!(graph.count(ResourceKind::Network), 1);
        assert_eq!(graph.count(ResourceKind::Subnet), 1);
        assert_eq!(graph.count(ResourceKind::Firewall), 1);
        assert!(graph.nodes().iter().all(|n| n.resource_type() != "AWS::EC2::NatGateway"));
    }

    #[test]
    fn test_firewall_has_no_ingress() {
        let graph = apply("clawdbot");
        let sg = graph.single(ResourceKind::Firewall).unwrap();
        assert!(sg.get_property("SecurityGroupIngress").is_none());
        assert_eq!(sg.get_property("GroupName"), Some(&json!("clawdbot-gateway-sg")));
    }

    #[test]
    fn test_egress_per_product() {
        let open = apply("openclaw");
        let egress = open
            .single(ResourceKind::Firewall)
            .unwrap()
            .get_property("SecurityGroupEgress")
            .unwrap();
        assert_eq!(egress[0]["FromPort"], 443);

        let molt = apply("moltbot");
        let egress = molt
            .single(ResourceKind::Firewall)
            .unwrap()
            .get_property("SecurityGroupEgress")
            .unwrap();
        assert_eq!(egress[0]["IpProtocol"], "-1");
    }

    #[test]
    fn test_default_route_waits_for_attachment() {
        let graph = apply("openclaw");
        let route = graph.get("OpenClawPublicDefaultRoute").unwrap();
        assert_eq!(route.dependencies(), &["OpenClawGatewayAttachment".to_string()]);
    }
}
