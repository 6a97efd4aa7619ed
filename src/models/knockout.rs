//! Knockout bracket: rounds, slots and matches.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a knockout match.
pub type KnockoutMatchId = Uuid;

/// Knockout round, ordered from earliest to the Final.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    RoundOf32,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Round {
    pub const ALL: [Round; 5] = [
        Round::RoundOf32,
        Round::RoundOf16,
        Round::QuarterFinal,
        Round::SemiFinal,
        Round::Final,
    ];

    /// Short label used in placeholders ("Winner QF1").
    pub fn short_label(self) -> &'static str {
        match self {
            Round::RoundOf32 => "R32",
            Round::RoundOf16 => "R16",
            Round::QuarterFinal => "QF",
            Round::SemiFinal => "SF",
            Round::Final => "F",
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Round::RoundOf32 => write!(f, "Round of 32"),
            Round::RoundOf16 => write!(f, "Round of 16"),
            Round::QuarterFinal => write!(f, "Quarterfinal"),
            Round::SemiFinal => write!(f, "Semifinal"),
            Round::Final => write!(f, "Final"),
        }
    }
}

/// One side of a knockout match: a concrete team, a textual stand-in for a
/// participant not known yet, or nothing at all.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Slot {
    Team(TeamId),
    Placeholder(String),
    #[default]
    Empty,
}

impl Slot {
    /// Build a slot from the optional form fields. A team takes precedence over a
    /// placeholder; a blank placeholder counts as absent.
    pub fn from_parts(team: Option<TeamId>, placeholder: Option<String>) -> Self {
        match (team, placeholder) {
            (Some(id), _) => Slot::Team(id),
            (None, Some(text)) => Slot::placeholder(text),
            (None, None) => Slot::Empty,
        }
    }

    /// Placeholder slot; whitespace-only text becomes `Empty`.
    pub fn placeholder(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Slot::Empty
        } else {
            Slot::Placeholder(trimmed.to_string())
        }
    }

    pub fn team(&self) -> Option<TeamId> {
        match self {
            Slot::Team(id) => Some(*id),
            _ => None,
        }
    }

    pub fn placeholder_text(&self) -> Option<&str> {
        match self {
            Slot::Placeholder(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// A single knockout match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutMatch {
    pub id: KnockoutMatchId,
    pub round: Round,
    /// Position within the round (1-based, display order).
    pub match_order: u32,
    pub slot_a: Slot,
    pub slot_b: Slot,
    /// Set once the match is decided; always one of the slot teams.
    pub winner: Option<TeamId>,
}

impl KnockoutMatch {
    pub fn new(round: Round, match_order: u32, slot_a: Slot, slot_b: Slot) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_order,
            slot_a,
            slot_b,
            winner: None,
        }
    }

    pub fn teams(&self) -> (Option<TeamId>, Option<TeamId>) {
        (self.slot_a.team(), self.slot_b.team())
    }

    pub fn contains_team(&self, team: TeamId) -> bool {
        self.slot_a.team() == Some(team) || self.slot_b.team() == Some(team)
    }

    /// The team on the other side from `team`, if `team` plays in this match.
    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        match self.teams() {
            (Some(a), b) if a == team => b,
            (a, Some(b)) if b == team => a,
            _ => None,
        }
    }

    /// Loser of a decided match, when both sides are concrete teams.
    pub fn loser(&self) -> Option<TeamId> {
        self.winner.and_then(|w| self.opponent_of(w))
    }

    /// Placeholder text that refers to this match's winner, e.g. "Winner QF1".
    pub fn winner_label(&self) -> String {
        format!("Winner {}{}", self.round.short_label(), self.match_order)
    }
}

/// Champion and runner-up read from a decided Final.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinalOutcome {
    pub champion: TeamId,
    pub runner_up: Option<TeamId>,
}

/// All knockout rounds, each holding its matches in `match_order`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutStage {
    pub rounds: BTreeMap<Round, Vec<KnockoutMatch>>,
}

impl KnockoutStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.values().all(|r| r.is_empty())
    }

    /// Total number of matches across rounds.
    pub fn len(&self) -> usize {
        self.rounds.values().map(Vec::len).sum()
    }

    pub fn round(&self, round: Round) -> &[KnockoutMatch] {
        self.rounds.get(&round).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn matches(&self) -> impl Iterator<Item = &KnockoutMatch> {
        self.rounds.values().flatten()
    }

    pub fn get(&self, id: KnockoutMatchId) -> Option<&KnockoutMatch> {
        self.matches().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: KnockoutMatchId) -> Option<&mut KnockoutMatch> {
        self.rounds.values_mut().flatten().find(|m| m.id == id)
    }

    /// Next free match order in a round (one past the current maximum).
    pub fn next_match_order(&self, round: Round) -> u32 {
        self.round(round)
            .iter()
            .map(|m| m.match_order)
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn insert(&mut self, m: KnockoutMatch) {
        let round = self.rounds.entry(m.round).or_default();
        round.push(m);
        round.sort_by_key(|m| m.match_order);
    }

    pub fn remove(&mut self, id: KnockoutMatchId) -> Option<KnockoutMatch> {
        let mut removed = None;
        for matches in self.rounds.values_mut() {
            if let Some(idx) = matches.iter().position(|m| m.id == id) {
                removed = Some(matches.remove(idx));
                break;
            }
        }
        self.rounds.retain(|_, matches| !matches.is_empty());
        removed
    }

    /// Re-sort a round after a match order edit.
    pub(crate) fn sort_round(&mut self, round: Round) {
        if let Some(matches) = self.rounds.get_mut(&round) {
            matches.sort_by_key(|m| m.match_order);
        }
    }

    /// Whether any slot refers to `team`.
    pub fn references_team(&self, team: TeamId) -> bool {
        self.matches().any(|m| m.contains_team(team))
    }

    /// Champion and runner-up, once the Final has a winner.
    pub fn final_outcome(&self) -> Option<FinalOutcome> {
        let final_match = self.round(Round::Final).first()?;
        let champion = final_match.winner?;
        Some(FinalOutcome {
            champion,
            runner_up: final_match.loser(),
        })
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }
}
