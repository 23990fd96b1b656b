//! Power schedule
//!
//! Derives the start/stop actions implied by the schedule parameters and
//! replays them to answer whether the instance runs at a given hour of the
//! week. The schedule stage turns each action into an EventBridge rule; the
//! cost estimator uses the replay.

use crate::config::ScheduleConfig;
use serde::Serialize;
use std::fmt;

pub const HOURS_PER_WEEK: u32 = 7 * 24;

/// Weekend stop hour on Friday (UTC)
pub const WEEKEND_STOP_HOUR: u8 = 18;
/// Weekend start hour on Monday (UTC)
pub const WEEKEND_START_HOUR: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn index(&self) -> u32 {
        *self as u32
    }

    pub fn from_index(index: u32) -> Weekday {
        Self::ALL[(index % 7) as usize]
    }

    pub fn cron_name(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self, Weekday::Sat | Weekday::Sun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Start,
    Stop,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
        }
    }
}

/// Days of the week on which an action fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySet {
    EveryDay,
    Weekdays,
    Only(Weekday),
}

impl DaySet {
    pub fn contains(&self, day: Weekday) -> bool {
        match self {
            DaySet::EveryDay => true,
            DaySet::Weekdays => !day.is_weekend(),
            DaySet::Only(only) => *only == day,
        }
    }

    /// Day-of-week field of an EventBridge cron expression
    pub fn cron_field(&self) -> &'static str {
        match self {
            DaySet::EveryDay => "*",
            DaySet::Weekdays => "MON-FRI",
            DaySet::Only(day) => day.cron_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledAction {
    /// Stable name; used as the rule's logical id prefix
    pub name: &'static str,
    /// Physical rule name suffix, e.g. `nightly-shutdown`
    pub rule_suffix: &'static str,
    pub action: PowerAction,
    pub hour: u8,
    pub days: DaySet,
    pub description: String,
}

impl ScheduledAction {
    pub fn cron_expression(&self) -> String {
        format!("cron(0 {} ? * {} *)", self.hour, self.days.cron_field())
    }

    fn fires_at(&self, day: Weekday, hour: u8) -> bool {
        self.hour == hour && self.days.contains(day)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PowerSchedule {
    actions: Vec<ScheduledAction>,
}

impl PowerSchedule {
    /// The actions implied by `config`; empty when scheduling is off
    pub fn from_config(config: &ScheduleConfig) -> Self {
        if !config.enabled {
            return Self::default();
        }

        let daily = if config.weekend_shutdown {
            DaySet::Weekdays
        } else {
            DaySet::EveryDay
        };
        let mut actions = vec![
            ScheduledAction {
                name: "NightlyShutdown",
                rule_suffix: "nightly-shutdown",
                action: PowerAction::Stop,
                hour: config.shutdown_hour,
                days: daily,
                description: format!("Stop instance nightly at {}:00", config.shutdown_hour),
            },
            ScheduledAction {
                name: "MorningStartup",
                rule_suffix: "morning-startup",
                action: PowerAction::Start,
                hour: config.startup_hour,
                days: daily,
                description: format!("Start instance daily at {}:00", config.startup_hour),
            },
        ];

        if config.weekend_shutdown {
            actions.push(ScheduledAction {
                name: "WeekendShutdown",
                rule_suffix: "weekend-shutdown",
                action: PowerAction::Stop,
                hour: WEEKEND_STOP_HOUR,
                days: DaySet::Only(Weekday::Fri),
                description: "Stop instance for the weekend".to_string(),
            });
            actions.push(ScheduledAction {
                name: "MondayStartup",
                rule_suffix: "monday-startup",
                action: PowerAction::Start,
                hour: WEEKEND_START_HOUR,
                days: DaySet::Only(Weekday::Mon),
                description: "Start instance on Monday morning".to_string(),
            });
        }

        Self { actions }
    }

    pub fn actions(&self) -> &[ScheduledAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether the instance runs during `hour` on `day`
    ///
    /// The state comes from the most recent action at or before that hour,
    /// wrapping around the week. When a start and a stop fire together the
    /// start wins. With no actions at all the instance always runs.
    pub fn running_at(&self, day: Weekday, hour: u8) -> bool {
        let now = day.index() * 24 + u32::from(hour);
        for back in 0..HOURS_PER_WEEK {
            let t = (now + HOURS_PER_WEEK - back) % HOURS_PER_WEEK;
            let (d, h) = (Weekday::from_index(t / 24), (t % 24) as u8);
            let mut firing = self.actions.iter().filter(|a| a.fires_at(d, h)).peekable();
            if firing.peek().is_some() {
                return firing.any(|a| a.action == PowerAction::Start);
            }
        }
        true
    }

    /// Hours stopped over `days` consecutive days starting on a Monday
    pub fn stopped_hours(&self, days: u32) -> u32 {
        if self.actions.is_empty() {
            return 0;
        }
        let weekly: Vec<bool> = (0..HOURS_PER_WEEK)
            .map(|t| self.running_at(Weekday::from_index(t / 24), (t % 24) as u8))
            .collect();
        (0..days * 24)
            .filter(|t| !weekly[(t % HOURS_PER_WEEK) as usize])
            .count() as u32
    }
}

impl fmt::Display for PowerSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return f.write_str("Always on");
        }
        let parts: Vec<String> = self
            .actions
            .iter()
            .map(|a| {
                let verb = match a.action {
                    PowerAction::Start => "Startup",
                    PowerAction::Stop => "Shutdown",
                };
                let days = match a.days {
                    DaySet::EveryDay => String::new(),
                    other => format!(" {}", other.cron_field()),
                };
                format!("{}: {:02}:00{}", verb, a.hour, days)
            })
            .collect();
        write!(f, "{} (UTC)", parts.join(", "))
    }
}
