//! Walkover check: award stalled matches to the only side that showed up.

use crate::models::{Match, MatchId, ScheduleSettings, Side, TeamDirectory, Tournament};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Score awarded for a walkover, (winner, loser).
pub const WALKOVER_SCORE: (u32, u32) = (3, 0);

/// Whether each side of a match has been active since the matchday started.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActivitySignal {
    pub team_a: bool,
    pub team_b: bool,
}

impl ActivitySignal {
    /// The active side when exactly one side is active.
    pub fn sole_active_side(&self) -> Option<Side> {
        match (self.team_a, self.team_b) {
            (true, false) => Some(Side::A),
            (false, true) => Some(Side::B),
            _ => None,
        }
    }
}

/// Per-match activity provider. Matches with no data count as no activity.
pub trait ActivitySource {
    fn activity(&self, match_id: MatchId) -> ActivitySignal;
}

impl ActivitySource for HashMap<MatchId, ActivitySignal> {
    fn activity(&self, match_id: MatchId) -> ActivitySignal {
        self.get(&match_id).copied().unwrap_or_default()
    }
}

/// Latest activity of each side of one match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
struct LastSeen {
    team_a: Option<DateTime<Utc>>,
    team_b: Option<DateTime<Utc>>,
}

/// Last activity time of each side of each match, as reported by the chat or
/// match-room integration. Saved with the tournament so a restart keeps it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    last_seen: BTreeMap<MatchId, LastSeen>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    /// Note that `side` of `match_id` was active at `at`. Keeps the latest time.
    pub fn record(&mut self, match_id: MatchId, side: Side, at: DateTime<Utc>) {
        let seen = self.last_seen.entry(match_id).or_default();
        let slot = match side {
            Side::A => &mut seen.team_a,
            Side::B => &mut seen.team_b,
        };
        if slot.map_or(true, |prev| at > prev) {
            *slot = Some(at);
        }
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }

    /// Drop entries of matches that are gone or finished. Returns whether
    /// anything was dropped.
    pub fn prune(&mut self, matches: &[Match]) -> bool {
        let open: HashSet<MatchId> = matches
            .iter()
            .filter(|m| !m.is_finished())
            .map(|m| m.id)
            .collect();
        let before = self.last_seen.len();
        self.last_seen.retain(|id, _| open.contains(id));
        self.last_seen.len() != before
    }

    /// Signals counting only activity at or after `start` (all activity when None).
    pub fn signals_since(&self, start: Option<DateTime<Utc>>) -> HashMap<MatchId, ActivitySignal> {
        let counts = |at: Option<DateTime<Utc>>| {
            at.is_some_and(|at| start.map_or(true, |s| at >= s))
        };
        self.last_seen
            .iter()
            .map(|(&id, seen)| {
                let signal = ActivitySignal {
                    team_a: counts(seen.team_a),
                    team_b: counts(seen.team_b),
                };
                (id, signal)
            })
            .filter(|(_, signal)| signal.team_a || signal.team_b)
            .collect()
    }
}

/// Outcome of one walkover check.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct WalkoverReport {
    /// Number of matches resolved by this call.
    pub processed_count: usize,
    /// Human-readable summary for the admin.
    pub summary: String,
    pub resolved: Vec<MatchId>,
    /// Unfinished matches where neither or both sides were active.
    pub needs_review: Vec<MatchId>,
}

fn format_remaining(left: chrono::Duration) -> String {
    let minutes = left.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Resolve unfinished matches of the current matchday once its deadline has
/// passed (or right away with `force`). A match goes to the only active side with
/// [`WALKOVER_SCORE`]; matches with neither or both sides active are left for
/// review. Finished matches are skipped, so repeated calls change nothing.
pub fn check_and_resolve_timeouts<A, D>(
    settings: &ScheduleSettings,
    matches: &mut [Match],
    activity: &A,
    teams: &D,
    now: DateTime<Utc>,
    force: bool,
) -> WalkoverReport
where
    A: ActivitySource + ?Sized,
    D: TeamDirectory + ?Sized,
{
    let matchday = settings.current_matchday();
    if !force && !settings.is_expired(now) {
        let summary = match settings.remaining(now) {
            Some(left) => format!(
                "Matchday {} deadline not reached ({} left); nothing checked",
                matchday,
                format_remaining(left)
            ),
            None => format!("Matchday {} timer is not running; nothing checked", matchday),
        };
        return WalkoverReport {
            summary,
            ..Default::default()
        };
    }

    let mut report = WalkoverReport::default();
    let mut lines = Vec::new();
    for m in matches
        .iter_mut()
        .filter(|m| m.matchday == matchday && !m.is_finished())
    {
        let home = teams.display_name(m.team_a);
        let away = teams.display_name(m.team_b);
        let signal = activity.activity(m.id);
        match signal.sole_active_side() {
            Some(side) => {
                m.award_walkover(side, WALKOVER_SCORE);
                let winner = teams.display_name(m.team(side));
                log::info!("Walkover: {} vs {} awarded to {}", home, away, winner);
                lines.push(format!(
                    "{} vs {}: WO {}-{} to {}",
                    home, away, WALKOVER_SCORE.0, WALKOVER_SCORE.1, winner
                ));
                report.resolved.push(m.id);
            }
            None => {
                let reason = if signal.team_a {
                    "both sides active"
                } else {
                    "no activity from either side"
                };
                log::warn!("Walkover check: {} vs {} needs review ({})", home, away, reason);
                lines.push(format!("{} vs {}: needs review ({})", home, away, reason));
                report.needs_review.push(m.id);
            }
        }
    }

    report.processed_count = report.resolved.len();
    let mut summary = format!(
        "Matchday {}: {} match(es) resolved by walkover, {} left for review",
        matchday,
        report.processed_count,
        report.needs_review.len()
    );
    for line in lines {
        summary.push('\n');
        summary.push_str(&line);
    }
    report.summary = summary;
    report
}

impl Tournament {
    /// Run the walkover check against this tournament's schedule and fixtures.
    pub fn check_and_resolve_timeouts<A: ActivitySource + ?Sized>(
        &mut self,
        activity: &A,
        now: DateTime<Utc>,
        force: bool,
    ) -> WalkoverReport {
        check_and_resolve_timeouts(
            &self.schedule,
            &mut self.matches,
            activity,
            &self.teams,
            now,
            force,
        )
    }
}
