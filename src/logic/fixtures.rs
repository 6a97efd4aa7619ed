//! Group stage: round-robin fixture generation (circle method).

use crate::models::{GroupId, Match, TeamId, Tournament, TournamentError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many times each pair of teams meets.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegMode {
    /// Every pair meets once.
    #[default]
    Single,
    /// Every pair meets twice, home and away reversed.
    Double,
}

impl std::str::FromStr for LegMode {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(LegMode::Single),
            "double" | "2" => Ok(LegMode::Double),
            _ => Err(TournamentError::InvalidLegMode(s.to_string())),
        }
    }
}

/// One round-robin cycle for `teams`: a list of rounds, each a list of (home, away)
/// pairs in which every team appears at most once.
///
/// 1. Pad to an even count with a bye when the count is odd.
/// 2. Fix the first slot and rotate the rest one step per round, for n-1 rounds.
/// 3. Pair slot i with slot n-1-i; pairs with the bye are dropped.
/// 4. The fixed team alternates home and away between rounds.
pub fn round_robin_rounds(teams: &[TeamId]) -> Vec<Vec<(TeamId, TeamId)>> {
    let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut rounds = Vec::with_capacity(n - 1);
    for round in 0..n - 1 {
        let mut pairs = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            let (home, away) = (slots[i], slots[n - 1 - i]);
            let (home, away) = if i == 0 && round % 2 == 1 {
                (away, home)
            } else {
                (home, away)
            };
            if let (Some(home), Some(away)) = (home, away) {
                pairs.push((home, away));
            }
        }
        rounds.push(pairs);
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Full schedule for one group. Matchdays start at 1; in double mode the mirrored
/// rounds follow as further matchdays.
fn group_schedule(group: &GroupId, teams: &[TeamId], legs: LegMode) -> Result<Vec<Match>, TournamentError> {
    let first_leg = round_robin_rounds(teams);
    let leg_len = first_leg.len() as u32;

    let mut matches = Vec::new();
    for (idx, pairs) in first_leg.iter().enumerate() {
        let matchday = idx as u32 + 1;
        for &(home, away) in pairs {
            matches.push(Match::new(group.clone(), home, away, matchday)?);
        }
    }
    if legs == LegMode::Double {
        for (idx, pairs) in first_leg.iter().enumerate() {
            let matchday = leg_len + idx as u32 + 1;
            for &(home, away) in pairs {
                matches.push(Match::new(group.clone(), away, home, matchday)?);
            }
        }
    }
    Ok(matches)
}

/// Generate fixtures for every group in `groups`. All groups are validated before
/// any match is built, so an error leaves nothing half-generated.
pub fn generate_fixtures(
    groups: &BTreeMap<GroupId, Vec<TeamId>>,
    legs: LegMode,
) -> Result<Vec<Match>, TournamentError> {
    for (group, teams) in groups {
        if teams.len() < 2 {
            return Err(TournamentError::InsufficientTeams {
                group: group.clone(),
            });
        }
        for (i, id) in teams.iter().enumerate() {
            if teams[..i].contains(id) {
                return Err(TournamentError::DuplicateTeamSlots);
            }
        }
    }

    let mut matches = Vec::new();
    for (group, teams) in groups {
        matches.extend(group_schedule(group, teams, legs)?);
    }
    Ok(matches)
}

impl Tournament {
    /// Regenerate fixtures for the named groups. Existing fixtures and scores of
    /// those groups are discarded; other groups are left alone. Irreversible, so
    /// callers should confirm with the admin first.
    pub fn generate_fixtures(
        &mut self,
        groups: &[GroupId],
        legs: LegMode,
    ) -> Result<Vec<Match>, TournamentError> {
        let mut selected = BTreeMap::new();
        for group in groups {
            let teams = self.groups.get(group).cloned().unwrap_or_default();
            for id in &teams {
                self.require_team(*id)?;
            }
            selected.insert(group.clone(), teams);
        }

        let generated = generate_fixtures(&selected, legs)?;

        let before = self.matches.len();
        self.matches.retain(|m| !selected.contains_key(&m.group));
        let discarded = before - self.matches.len();
        self.matches.extend(generated.iter().cloned());
        log::info!(
            "Generated {} fixture(s) for group(s) {:?} ({:?} leg); discarded {} existing",
            generated.len(),
            groups,
            legs,
            discarded
        );
        Ok(generated)
    }

    /// Regenerate fixtures for every group.
    pub fn generate_all_fixtures(&mut self, legs: LegMode) -> Result<Vec<Match>, TournamentError> {
        let groups: Vec<GroupId> = self.groups.keys().cloned().collect();
        self.generate_fixtures(&groups, legs)
    }

    /// Highest matchday number in the current fixtures (0 when there are none).
    pub fn last_matchday(&self) -> u32 {
        self.matches.iter().map(|m| m.matchday).max().unwrap_or(0)
    }
}
