use crate::config::StackConfig;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub rule: &'static str,
    pub message: String,
}

/// A cross-parameter check that warns but never rejects
pub trait AdvisoryRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, config: &StackConfig) -> Option<String>;
}

pub struct ZeroLengthScheduleRule;

impl AdvisoryRule for ZeroLengthScheduleRule {
    fn name(&self) -> &'static str {
        "ZeroLengthSchedule"
    }

    fn check(&self, config: &StackConfig) -> Option<String> {
        let schedule = &config.schedule;
        (schedule.enabled && schedule.shutdown_hour == schedule.startup_hour).then(|| {
            format!(
                "shutdownHour and startupHour are both {}; the daily stop is immediately undone",
                schedule.shutdown_hour
            )
        })
    }
}

pub struct UnusedWeekendShutdownRule;

impl AdvisoryRule for UnusedWeekendShutdownRule {
    fn name(&self) -> &'static str {
        "UnusedWeekendShutdown"
    }

    fn check(&self, config: &StackConfig) -> Option<String> {
        (config.schedule.weekend_shutdown && !config.schedule.enabled).then(|| {
            "weekendShutdownEnabled has no effect unless scheduleEnabled is true".to_string()
        })
    }
}

pub struct SpotPriceAboveOnDemandRule;

impl AdvisoryRule for SpotPriceAboveOnDemandRule {
    fn name(&self) -> &'static str {
        "SpotPriceAboveOnDemand"
    }

    fn check(&self, config: &StackConfig) -> Option<String> {
        let on_demand = config.instance_size.on_demand_hourly_rate();
        (config.spot.enabled && config.spot.max_hourly_price > on_demand).then(|| {
            format!(
                "spotMaxHourlyPrice {} exceeds the {} on-demand rate of {}",
                config.spot.max_hourly_price,
                config.instance_size.value(),
                on_demand
            )
        })
    }
}
