//! Integration tests for season archival and reset.

use chrono::{TimeZone, Utc};
use tournament_progression::{
    LegMode, Round, ScheduleSettings, TeamId, Tournament, TournamentError, TournamentMode,
};
use uuid::Uuid;

/// A season in progress: two groups with fixtures, a decided Final, a running timer.
fn season_in_progress() -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Cup", TournamentMode::GroupsAndKnockout);
    let ids: Vec<TeamId> = (0..6)
        .map(|i| t.add_team(format!("Team {i}"), None).unwrap().id)
        .collect();
    t.assign_group("A", ids[..3].to_vec()).unwrap();
    t.assign_group("B", ids[3..].to_vec()).unwrap();
    t.generate_all_fixtures(LegMode::Double).unwrap();
    let first = t.matches[0].id;
    t.record_match_result(first, 2, 0, None).unwrap();

    let final_match = t
        .add_knockout_match(Round::Final, Some(ids[0]), Some(ids[3]), None, None)
        .unwrap();
    t.record_knockout_winner(final_match.id, ids[0]).unwrap();

    t.set_current_matchday(5);
    t.start_matchday(24.0, Utc::now()).unwrap();
    t.set_auto_process(true);
    (t, ids)
}

#[test]
fn archive_without_roster_resets_everything() {
    let (mut t, ids) = season_in_progress();
    let now = Utc.with_ymd_and_hms(2026, 6, 30, 21, 0, 0).unwrap();

    let entry = t
        .archive_season("Season 1", Some(ids[0]), None, false, now)
        .unwrap();
    assert_eq!(entry.season_name(), "Season 1");
    assert_eq!(entry.champion().id, ids[0]);
    assert_eq!(entry.champion().name, "Team 0");
    assert_eq!(entry.runner_up(), None);
    assert_eq!(entry.completed_at(), now);
    assert_eq!(entry.mode(), TournamentMode::GroupsAndKnockout);

    assert_eq!(t.history, vec![entry]);
    assert!(t.matches.is_empty());
    assert!(t.knockout.is_empty());
    assert!(t.groups.is_empty());
    assert!(t.teams.is_empty());
    assert_eq!(t.schedule, ScheduleSettings::default());
    assert!(!t.schedule.is_active());
    assert_eq!(t.schedule.current_matchday(), 1);
}

#[test]
fn archive_with_roster_keeps_teams() {
    let (mut t, ids) = season_in_progress();
    let roster_before = t.teams.clone();

    let outcome = t.final_outcome().unwrap();
    let entry = t
        .archive_season("Season 1", Some(outcome.champion), outcome.runner_up, true, Utc::now())
        .unwrap();
    assert_eq!(entry.runner_up().map(|team| team.id), Some(ids[3]));

    assert_eq!(t.teams, roster_before);
    assert!(t.matches.is_empty());
    assert!(t.knockout.is_empty());
    assert_eq!(t.schedule, ScheduleSettings::default());
}

#[test]
fn failed_archive_changes_nothing() {
    let (mut t, ids) = season_in_progress();
    let before = t.clone();

    assert_eq!(
        t.archive_season("Season 1", None, Some(ids[1]), false, Utc::now()),
        Err(TournamentError::MissingChampion)
    );
    assert_eq!(t, before);

    let stranger = Uuid::new_v4();
    assert_eq!(
        t.archive_season("Season 1", Some(ids[0]), Some(stranger), false, Utc::now()),
        Err(TournamentError::TeamNotFound(stranger))
    );
    assert_eq!(t, before);

    assert_eq!(
        t.archive_season("Season 1", Some(ids[0]), Some(ids[0]), true, Utc::now()),
        Err(TournamentError::DuplicateTeamSlots)
    );
    assert_eq!(t, before);
}

#[test]
fn history_accumulates_across_seasons() {
    let (mut t, ids) = season_in_progress();
    let first = t
        .archive_season("Season 1", Some(ids[0]), Some(ids[3]), true, Utc::now())
        .unwrap();

    t.assign_group("A", ids.clone()).unwrap();
    t.generate_all_fixtures(LegMode::Single).unwrap();
    let second = t
        .archive_season("  ", Some(ids[5]), None, false, Utc::now())
        .unwrap();

    assert_eq!(second.season_name(), "Season 2");
    assert_ne!(first.season_id(), second.season_id());
    assert_eq!(t.history.len(), 2);
    assert_eq!(t.history[0], first);
    assert_eq!(t.history[1].champion().name, "Team 5");
}
