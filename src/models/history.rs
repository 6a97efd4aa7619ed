//! SeasonHistory: one archived season.

use crate::models::team::Team;
use crate::models::tournament::TournamentMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an archived season.
pub type SeasonId = Uuid;

/// Outcome of a finished season. Teams are stored by value so the record stays
/// readable after the roster is cleared. Read-only once created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeasonHistory {
    season_id: SeasonId,
    season_name: String,
    champion: Team,
    runner_up: Option<Team>,
    completed_at: DateTime<Utc>,
    mode: TournamentMode,
}

impl SeasonHistory {
    pub(crate) fn new(
        season_name: String,
        champion: Team,
        runner_up: Option<Team>,
        completed_at: DateTime<Utc>,
        mode: TournamentMode,
    ) -> Self {
        Self {
            season_id: Uuid::new_v4(),
            season_name,
            champion,
            runner_up,
            completed_at,
            mode,
        }
    }

    pub fn season_id(&self) -> SeasonId {
        self.season_id
    }

    pub fn season_name(&self) -> &str {
        &self.season_name
    }

    pub fn champion(&self) -> &Team {
        &self.champion
    }

    pub fn runner_up(&self) -> Option<&Team> {
        self.runner_up.as_ref()
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn mode(&self) -> TournamentMode {
        self.mode
    }
}
