//! Matchday scheduler: Paused / Running state machine over ScheduleSettings.
//!
//! Expiry is never acted on here. It is only observable through [`ScheduleSettings::remaining`]
//! and [`ScheduleSettings::is_expired`], or by running the walkover check.

use crate::models::{ScheduleSettings, Tournament, TournamentError};
use chrono::{DateTime, Duration, Utc};

/// Whole milliseconds in `hours`; None unless at least 1 ms and representable.
fn hours_to_duration(hours: f64) -> Option<Duration> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis < 1.0 || millis >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

impl ScheduleSettings {
    /// Paused -> Running. Starting while running restarts the window from `now`.
    pub fn start(&mut self, duration_hours: f64, now: DateTime<Utc>) -> Result<(), TournamentError> {
        // The deadline must be representable, not just the duration.
        hours_to_duration(duration_hours)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or(TournamentError::InvalidDuration)?;
        self.is_active = true;
        self.matchday_start_time = Some(now);
        self.matchday_duration_hours = duration_hours;
        Ok(())
    }

    /// Running -> Paused. Keeps the matchday number.
    pub fn pause(&mut self) {
        self.is_active = false;
        self.matchday_start_time = None;
    }

    /// Jump to matchday `n` (at least 1). The timer is left as it is.
    pub fn set_matchday(&mut self, n: u32) {
        self.current_matchday = n.max(1);
    }

    /// Move on to the next matchday. The timer is left as it is.
    pub fn advance_matchday(&mut self) {
        self.current_matchday = self.current_matchday.saturating_add(1);
    }

    pub fn set_auto_process(&mut self, enabled: bool) {
        self.auto_process_enabled = enabled;
    }

    /// End of the current window; None while paused.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        if !self.is_active {
            return None;
        }
        let window = hours_to_duration(self.matchday_duration_hours)?;
        self.matchday_start_time?.checked_add_signed(window)
    }

    /// Time left until the deadline (negative once past); None while paused.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.signed_duration_since(now))
    }

    /// Running and the deadline has been reached.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_some_and(|left| left <= Duration::zero())
    }
}

impl Tournament {
    pub fn start_matchday(
        &mut self,
        duration_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<&ScheduleSettings, TournamentError> {
        self.schedule.start(duration_hours, now)?;
        log::info!(
            "Matchday {} started for {}h",
            self.schedule.current_matchday(),
            duration_hours
        );
        Ok(&self.schedule)
    }

    pub fn pause_matchday(&mut self) -> &ScheduleSettings {
        self.schedule.pause();
        log::info!("Matchday {} paused", self.schedule.current_matchday());
        &self.schedule
    }

    pub fn set_current_matchday(&mut self, n: u32) -> &ScheduleSettings {
        self.schedule.set_matchday(n);
        log::info!("Current matchday set to {}", self.schedule.current_matchday());
        &self.schedule
    }

    pub fn advance_matchday(&mut self) -> &ScheduleSettings {
        self.schedule.advance_matchday();
        log::info!("Advanced to matchday {}", self.schedule.current_matchday());
        &self.schedule
    }

    pub fn set_auto_process(&mut self, enabled: bool) -> &ScheduleSettings {
        self.schedule.set_auto_process(enabled);
        &self.schedule
    }
}
