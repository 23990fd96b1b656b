use super::{ids, CPU_ALARM, HEALTH_ALARM};
use crate::config::StackConfig;
use crate::error::ConstraintViolation;
use crate::graph::expr::reference;
use crate::graph::{DeletionPolicy, ResourceGraph, ResourceKind, ResourceNode};
use crate::pipeline::stage::CompositionStage;
use serde_json::{json, Value};

pub const LOG_RETENTION_DAYS: u32 = 7;
const ALARM_PERIOD_SECONDS: u32 = 300;

/// Log sink path the gateway writes to
pub fn log_group_name(config: &StackConfig) -> String {
    format!("/{}/gateway", config.product.slug())
}

struct AlarmSpec<'a> {
    logical_id: &'a str,
    name: String,
    description: String,
    metric: &'a str,
    statistic: &'a str,
    threshold: u32,
    comparison: &'a str,
    evaluation_periods: u32,
}

impl AlarmSpec<'_> {
    fn build(&self, instance: &str) -> ResourceNode {
        ResourceNode::new(self.logical_id, ResourceKind::Alarm, "AWS::CloudWatch::Alarm")
            .property("AlarmName", json!(self.name))
            .property("AlarmDescription", json!(self.description))
            .property("Namespace", json!("AWS/EC2"))
            .property("MetricName", json!(self.metric))
            .property("Dimensions", dimensions(instance))
            .property("Statistic", json!(self.statistic))
            .property("Period", json!(ALARM_PERIOD_SECONDS))
            .property("EvaluationPeriods", json!(self.evaluation_periods))
            .property("Threshold", json!(self.threshold))
            .property("ComparisonOperator", json!(self.comparison))
            .property("TreatMissingData", json!("notBreaching"))
    }
}

fn dimensions(instance: &str) -> Value {
    json!([{ "Name": "InstanceId", "Value": reference(instance) }])
}

/// Health and CPU alarms on the instance, plus the gateway log group
pub struct MonitoringStage;

impl CompositionStage for MonitoringStage {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        let instance = graph.single(ResourceKind::Compute)?.logical_id().to_string();
        let display = config.product.name();
        let slug = config.product.slug();

        let health = AlarmSpec {
            logical_id: HEALTH_ALARM,
            name: format!("{}-instance-health", slug),
            description: format!("Alert when {} instance fails health checks", display),
            metric: "StatusCheckFailed",
            statistic: "Maximum",
            threshold: 1,
            comparison: "GreaterThanOrEqualToThreshold",
            evaluation_periods: 2,
        };
        let cpu = AlarmSpec {
            logical_id: CPU_ALARM,
            name: format!("{}-cpu-high", slug),
            description: "Alert when CPU utilization exceeds 90% for 15 minutes".to_string(),
            metric: "CPUUtilization",
            statistic: "Average",
            threshold: 90,
            comparison: "GreaterThanThreshold",
            evaluation_periods: 3,
        };

        let log_group = ResourceNode::new(
            ids(config).log_group(),
            ResourceKind::LogSink,
            "AWS::Logs::LogGroup",
        )
        .property("LogGroupName", json!(log_group_name(config)))
        .property("RetentionInDays", json!(LOG_RETENTION_DAYS))
        .deletion_policy(DeletionPolicy::Delete);

        graph.insert_all([health.build(&instance), cpu.build(&instance), log_group])
    }
}
