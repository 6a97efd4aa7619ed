//! Season end: record the outcome in history, then reset for the next season.

use crate::models::{ScheduleSettings, SeasonHistory, TeamId, Tournament, TournamentError};
use chrono::{DateTime, Utc};

impl Tournament {
    /// Archive the season and reset the tournament.
    ///
    /// Everything is validated before anything changes, so the caller sees either
    /// the history entry together with the reset, or an error and the old state.
    /// Fixtures, groups, the bracket and the schedule are always reset; the roster
    /// is kept only when `retain_roster` is set. History is never cleared.
    pub fn archive_season(
        &mut self,
        season_name: impl Into<String>,
        champion: Option<TeamId>,
        runner_up: Option<TeamId>,
        retain_roster: bool,
        now: DateTime<Utc>,
    ) -> Result<SeasonHistory, TournamentError> {
        let champion_id = champion.ok_or(TournamentError::MissingChampion)?;
        let champion = self.require_team(champion_id)?.clone();
        let runner_up = match runner_up {
            Some(id) if id == champion_id => return Err(TournamentError::DuplicateTeamSlots),
            Some(id) => Some(self.require_team(id)?.clone()),
            None => None,
        };

        let season_name = season_name.into();
        let season_name = match season_name.trim() {
            "" => format!("Season {}", self.history.len() + 1),
            name => name.to_string(),
        };

        let entry = SeasonHistory::new(season_name, champion, runner_up, now, self.mode);
        self.history.push(entry.clone());

        self.matches.clear();
        self.groups.clear();
        self.knockout.clear();
        self.schedule = ScheduleSettings::default();
        if !retain_roster {
            self.teams.clear();
        }

        log::info!(
            "Archived {} (champion {}); roster {}",
            entry.season_name(),
            entry.champion().name,
            if retain_roster { "kept" } else { "cleared" }
        );
        Ok(entry)
    }
}
