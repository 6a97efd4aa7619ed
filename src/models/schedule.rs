//! ScheduleSettings: matchday counter and countdown window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default length of a matchday window.
pub const DEFAULT_MATCHDAY_HOURS: f64 = 24.0;

/// Matchday timer state. Fields are only changed through the scheduler transitions
/// so that `matchday_start_time` is set exactly when `is_active` is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub(crate) is_active: bool,
    pub(crate) current_matchday: u32,
    pub(crate) matchday_start_time: Option<DateTime<Utc>>,
    pub(crate) matchday_duration_hours: f64,
    pub(crate) auto_process_enabled: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            is_active: false,
            current_matchday: 1,
            matchday_start_time: None,
            matchday_duration_hours: DEFAULT_MATCHDAY_HOURS,
            auto_process_enabled: false,
        }
    }
}

impl ScheduleSettings {
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn current_matchday(&self) -> u32 {
        self.current_matchday
    }

    pub fn matchday_start_time(&self) -> Option<DateTime<Utc>> {
        self.matchday_start_time
    }

    pub fn matchday_duration_hours(&self) -> f64 {
        self.matchday_duration_hours
    }

    pub fn auto_process_enabled(&self) -> bool {
        self.auto_process_enabled
    }
}
