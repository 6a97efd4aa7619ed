//! Tournament root aggregate, TournamentMode and TournamentError.

use crate::models::fixture::{GroupId, Match, MatchId};
use crate::models::history::SeasonHistory;
use crate::models::knockout::{KnockoutMatchId, KnockoutStage};
use crate::models::schedule::ScheduleSettings;
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// A group has fewer than 2 teams.
    InsufficientTeams { group: GroupId },
    /// Leg mode is neither single nor double.
    InvalidLegMode(String),
    /// The same team was put on both sides of a match.
    DuplicateTeamSlots,
    /// Matchday duration must be a positive number of hours.
    InvalidDuration,
    /// Archiving needs a champion.
    MissingChampion,
    TeamNotFound(TeamId),
    MatchNotFound(MatchId),
    KnockoutMatchNotFound(KnockoutMatchId),
    /// The chosen winner does not occupy either slot of the match.
    WinnerNotInMatch,
    /// Propagation source has no winner yet.
    WinnerNotDecided,
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// Team names must not be blank.
    InvalidTeamName,
    /// Team is still referenced by a fixture or bracket slot.
    TeamInUse(TeamId),
    /// Group draw needs at least one group.
    InvalidGroupCount,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InsufficientTeams { group } => {
                write!(f, "Group {} needs at least 2 teams", group)
            }
            TournamentError::InvalidLegMode(mode) => {
                write!(f, "Unknown leg mode '{}' (expected single or double)", mode)
            }
            TournamentError::DuplicateTeamSlots => write!(f, "A team cannot play against itself"),
            TournamentError::InvalidDuration => {
                write!(f, "Matchday duration must be greater than 0 hours")
            }
            TournamentError::MissingChampion => write!(f, "A champion is required to archive the season"),
            TournamentError::TeamNotFound(_) => write!(f, "Team not found"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::KnockoutMatchNotFound(_) => write!(f, "Knockout match not found"),
            TournamentError::WinnerNotInMatch => write!(f, "Winner must be one of the teams in the match"),
            TournamentError::WinnerNotDecided => write!(f, "Match has no winner yet"),
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::InvalidTeamName => write!(f, "Team name must not be empty"),
            TournamentError::TeamInUse(_) => {
                write!(f, "Team is still scheduled in a match; regenerate fixtures first")
            }
            TournamentError::InvalidGroupCount => write!(f, "Number of groups must be at least 1"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Format of the tournament; recorded into season history.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentMode {
    /// Group stage only.
    League,
    /// Group stage followed by a knockout bracket.
    #[default]
    GroupsAndKnockout,
    /// Knockout bracket only.
    Knockout,
}

impl std::str::FromStr for TournamentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "league" => Ok(TournamentMode::League),
            "groups_and_knockout" | "groups" => Ok(TournamentMode::GroupsAndKnockout),
            "knockout" => Ok(TournamentMode::Knockout),
            other => Err(format!("unknown tournament mode '{}'", other)),
        }
    }
}

/// Full tournament state: roster, groups, fixtures, bracket, timer and history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub mode: TournamentMode,
    pub teams: Vec<Team>,
    /// Team ids per group, in seeding order.
    pub groups: BTreeMap<GroupId, Vec<TeamId>>,
    /// Group-stage fixtures across all groups.
    pub matches: Vec<Match>,
    pub knockout: KnockoutStage,
    pub schedule: ScheduleSettings,
    /// Archived seasons, oldest first. Never cleared by a reset.
    pub history: Vec<SeasonHistory>,
}

impl Tournament {
    /// Create an empty tournament: no teams, paused at matchday 1.
    pub fn new(name: impl Into<String>, mode: TournamentMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mode,
            teams: Vec::new(),
            groups: BTreeMap::new(),
            matches: Vec::new(),
            knockout: KnockoutStage::new(),
            schedule: ScheduleSettings::default(),
            history: Vec::new(),
        }
    }

    /// Create a tournament with an initial roster.
    pub fn with_teams(name: impl Into<String>, mode: TournamentMode, teams: Vec<Team>) -> Self {
        Self {
            teams,
            ..Self::new(name, mode)
        }
    }

    pub fn get_team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub(crate) fn require_team(&self, id: TeamId) -> Result<&Team, TournamentError> {
        self.get_team(id).ok_or(TournamentError::TeamNotFound(id))
    }

    pub fn get_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Add a team to the roster. Names must be unique (case-insensitive).
    pub fn add_team(
        &mut self,
        name: impl Into<String>,
        logo: Option<String>,
    ) -> Result<&Team, TournamentError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::InvalidTeamName);
        }
        let is_duplicate = self
            .teams
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(TournamentError::DuplicateTeamName);
        }
        let mut team = Team::new(name_trimmed);
        team.logo = logo.filter(|l| !l.trim().is_empty());
        log::debug!("Added team {} ({})", team.name, team.id);
        self.teams.push(team);
        Ok(&self.teams[self.teams.len() - 1])
    }

    /// Remove a team from the roster and from any group. Rejected while a fixture
    /// or knockout slot still refers to it.
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<Team, TournamentError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        if self.matches.iter().any(|m| m.involves(team_id)) || self.knockout.references_team(team_id) {
            return Err(TournamentError::TeamInUse(team_id));
        }
        for members in self.groups.values_mut() {
            members.retain(|id| *id != team_id);
        }
        Ok(self.teams.remove(idx))
    }

    /// Set the members of a group, replacing any previous members. A team can only
    /// be in one group, so it is removed from the others.
    pub fn assign_group(
        &mut self,
        group: impl Into<GroupId>,
        team_ids: Vec<TeamId>,
    ) -> Result<(), TournamentError> {
        let group = group.into();
        for (i, id) in team_ids.iter().enumerate() {
            self.require_team(*id)?;
            if team_ids[..i].contains(id) {
                return Err(TournamentError::DuplicateTeamSlots);
            }
        }
        for (name, members) in self.groups.iter_mut() {
            if *name != group {
                members.retain(|id| !team_ids.contains(id));
            }
        }
        self.groups.retain(|name, members| *name == group || !members.is_empty());
        self.groups.insert(group, team_ids);
        Ok(())
    }

    /// Matches of one matchday (across groups).
    pub fn matches_on_matchday(&self, matchday: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.matchday == matchday)
    }

    /// Reassign the teams of a group-stage match (resets its result).
    pub fn update_match_teams(
        &mut self,
        match_id: MatchId,
        team_a: TeamId,
        team_b: TeamId,
    ) -> Result<&Match, TournamentError> {
        self.require_team(team_a)?;
        self.require_team(team_b)?;
        let m = self
            .get_match_mut(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        m.reassign_teams(team_a, team_b)?;
        log::info!("Match {} reassigned; result cleared", match_id);
        Ok(m)
    }

    /// Record a played result for a group-stage match.
    pub fn record_match_result(
        &mut self,
        match_id: MatchId,
        score_a: u32,
        score_b: u32,
        proof: Option<String>,
    ) -> Result<&Match, TournamentError> {
        let m = self
            .get_match_mut(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        m.record_result(score_a, score_b, proof);
        Ok(m)
    }
}
