//! Group-stage Match and MatchStatus.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group-stage match.
pub type MatchId = Uuid;

/// Group label (e.g. "A").
pub type GroupId = String;

/// Lifecycle of a group-stage match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

/// A single group-stage fixture between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub group: GroupId,
    /// Home side.
    pub team_a: TeamId,
    /// Away side.
    pub team_b: TeamId,
    pub status: MatchStatus,
    /// None until a result is recorded.
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    /// Proof-of-result reference (screenshot link etc.).
    pub proof: Option<String>,
    pub matchday: u32,
    /// Result was awarded by the walkover check rather than played.
    #[serde(default)]
    pub walkover: bool,
}

impl Match {
    /// New scheduled match with no result. Rejects a team playing itself.
    pub fn new(
        group: impl Into<GroupId>,
        team_a: TeamId,
        team_b: TeamId,
        matchday: u32,
    ) -> Result<Self, TournamentError> {
        if team_a == team_b {
            return Err(TournamentError::DuplicateTeamSlots);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group: group.into(),
            team_a,
            team_b,
            status: MatchStatus::Scheduled,
            score_a: None,
            score_b: None,
            proof: None,
            matchday,
            walkover: false,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team_a == team || self.team_b == team
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::A => self.team_a,
            Side::B => self.team_b,
        }
    }

    /// Replace the pairing. Whatever the previous state, the match goes back to
    /// scheduled with no result: a result never outlives the pairing it was for.
    pub fn reassign_teams(&mut self, team_a: TeamId, team_b: TeamId) -> Result<(), TournamentError> {
        if team_a == team_b {
            return Err(TournamentError::DuplicateTeamSlots);
        }
        self.team_a = team_a;
        self.team_b = team_b;
        self.reset_result();
        Ok(())
    }

    /// Mark the match as being played.
    pub fn start(&mut self) {
        if self.status == MatchStatus::Scheduled {
            self.status = MatchStatus::Live;
        }
    }

    /// Record a played result and finish the match.
    pub fn record_result(&mut self, score_a: u32, score_b: u32, proof: Option<String>) {
        self.score_a = Some(score_a);
        self.score_b = Some(score_b);
        self.proof = proof.filter(|p| !p.trim().is_empty());
        self.walkover = false;
        self.status = MatchStatus::Finished;
    }

    /// Award the match to `winner` with a forfeit score.
    pub(crate) fn award_walkover(&mut self, winner: Side, score: (u32, u32)) {
        let (won, lost) = score;
        let (a, b) = match winner {
            Side::A => (won, lost),
            Side::B => (lost, won),
        };
        self.score_a = Some(a);
        self.score_b = Some(b);
        self.proof = None;
        self.walkover = true;
        self.status = MatchStatus::Finished;
    }

    fn reset_result(&mut self) {
        self.status = MatchStatus::Scheduled;
        self.score_a = None;
        self.score_b = None;
        self.proof = None;
        self.walkover = false;
    }
}
