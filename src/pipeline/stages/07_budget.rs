use super::ids;
use crate::config::StackConfig;
use crate::error::ConstraintViolation;
use crate::graph::{ResourceGraph, ResourceKind, ResourceNode};
use crate::pipeline::stage::CompositionStage;
use serde_json::{json, Value};

pub const ACTUAL_THRESHOLD_PERCENT: u32 = 80;
pub const FORECAST_THRESHOLD_PERCENT: u32 = 100;

/// Cost-allocation filter that scopes the budget to this deployment
pub fn cost_filter(config: &StackConfig) -> String {
    format!("user:Application${}", config.product.name())
}

fn notifications(email: Option<&str>) -> Value {
    let Some(email) = email else {
        return json!([]);
    };
    let notification = |kind: &str, threshold: u32| {
        json!({
            "Notification": {
                "NotificationType": kind,
                "ComparisonOperator": "GREATER_THAN",
                "Threshold": threshold,
                "ThresholdType": "PERCENTAGE"
            },
            "Subscribers": [{ "SubscriptionType": "EMAIL", "Address": email }]
        })
    };
    json!([
        notification("ACTUAL", ACTUAL_THRESHOLD_PERCENT),
        notification("FORECASTED", FORECAST_THRESHOLD_PERCENT),
    ])
}

/// Monthly cost budget with optional e-mail alerts
pub struct BudgetStage;

impl CompositionStage for BudgetStage {
    fn name(&self) -> &'static str {
        "budget"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        let budget = ResourceNode::new(ids(config).budget(), ResourceKind::Budget, "AWS::Budgets::Budget")
            .property(
                "Budget",
                json!({
                    "BudgetName": format!("{}-Monthly-Budget", config.product.name()),
                    "BudgetLimit": {
                        "Amount": config.monthly_budget_limit,
                        "Unit": "USD"
                    },
                    "TimeUnit": "MONTHLY",
                    "BudgetType": "COST",
                    "CostFilters": {
                        "TagKeyValue": [cost_filter(config)]
                    }
                }),
            )
            .property(
                "NotificationsWithSubscribers",
                notifications(config.budget_alert_email.as_deref()),
            );
        graph.insert(budget)
    }
}
