//! Monthly compute cost estimate
//!
//! `active hours x hourly rate`, where active hours are the month's hours
//! minus the hours the power schedule keeps the instance stopped. Purely
//! informational: nothing in composition depends on it.

use crate::config::StackConfig;
use crate::params::InstanceSize;
use crate::schedule::PowerSchedule;
use serde::Serialize;
use std::fmt;

/// Billing hours in an average month
pub const HOURS_PER_MONTH: u32 = 730;
/// Days replayed when counting scheduled stop hours
pub const SCHEDULE_DAYS_PER_MONTH: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingMode {
    OnDemand,
    Spot,
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMode::OnDemand => f.write_str("on-demand"),
            PricingMode::Spot => f.write_str("spot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub instance_size: InstanceSize,
    pub pricing: PricingMode,
    pub hourly_rate: f64,
    pub total_hours: u32,
    pub stopped_hours: u32,
    pub active_hours: u32,
    pub monthly_cost: f64,
    /// Cost of the same instance on demand and never stopped
    pub baseline_cost: f64,
    pub savings: f64,
    pub schedule: String,
}

impl CostEstimate {
    pub fn for_config(config: &StackConfig) -> Self {
        let schedule = PowerSchedule::from_config(&config.schedule);
        let (pricing, hourly_rate) = if config.spot.enabled {
            (PricingMode::Spot, config.spot.max_hourly_price)
        } else {
            (
                PricingMode::OnDemand,
                config.instance_size.on_demand_hourly_rate(),
            )
        };

        let stopped_hours = schedule
            .stopped_hours(SCHEDULE_DAYS_PER_MONTH)
            .min(HOURS_PER_MONTH);
        let active_hours = HOURS_PER_MONTH - stopped_hours;
        let monthly_cost = round_cents(f64::from(active_hours) * hourly_rate);
        let baseline_cost = round_cents(
            f64::from(HOURS_PER_MONTH) * config.instance_size.on_demand_hourly_rate(),
        );

        Self {
            instance_size: config.instance_size,
            pricing,
            hourly_rate,
            total_hours: HOURS_PER_MONTH,
            stopped_hours,
            active_hours,
            monthly_cost,
            baseline_cost,
            savings: round_cents((baseline_cost - monthly_cost).max(0.0)),
            schedule: schedule.to_string(),
        }
    }

    /// One-line form used for the `EstimatedMonthlyCost` output
    pub fn summary(&self) -> String {
        format!(
            "${:.2}/month (EC2, {} {}, {} active hours)",
            self.monthly_cost,
            self.instance_size.value(),
            self.pricing,
            self.active_hours
        )
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Instance:      {} ({})", self.instance_size.value(), self.pricing)?;
        writeln!(f, "Hourly rate:   ${}", self.hourly_rate)?;
        writeln!(f, "Schedule:      {}", self.schedule)?;
        writeln!(
            f,
            "Active hours:  {} of {} ({} stopped)",
            self.active_hours, self.total_hours, self.stopped_hours
        )?;
        writeln!(f, "Monthly cost:  ${:.2}", self.monthly_cost)?;
        write!(
            f,
            "Savings:       ${:.2} vs ${:.2} always-on on-demand",
            self.savings, self.baseline_cost
        )
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
