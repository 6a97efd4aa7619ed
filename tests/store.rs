//! Integration tests for transactions and record persistence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::PathBuf;
use tournament_progression::{
    ActivitySignal, LegMode, MatchId, MatchStatus, Round, Side, StoreError, TeamId, Tournament,
    TournamentError, TournamentMode, TournamentStore,
};
use uuid::Uuid;

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("tournament-store-test-{}", Uuid::new_v4()))
}

fn store_with_teams(n: usize) -> (TournamentStore, Vec<TeamId>) {
    let mut store = TournamentStore::new(Tournament::new("Cup", TournamentMode::GroupsAndKnockout));
    let ids = store
        .transact(|t| {
            (0..n)
                .map(|i| t.add_team(format!("Team {i}"), None).map(|team| team.id))
                .collect::<Result<Vec<_>, _>>()
        })
        .unwrap();
    (store, ids)
}

#[test]
fn commit_bumps_only_changed_records() {
    let (mut store, ids) = store_with_teams(4);
    let before = store.versions();
    assert_eq!(before.teams, 2);

    store
        .transact(|t| {
            t.assign_group("A", ids.clone())?;
            t.generate_all_fixtures(LegMode::Single)
        })
        .unwrap();
    let after = store.versions();
    assert_eq!(after.fixtures, before.fixtures + 1);
    assert_eq!(after.teams, before.teams);
    assert_eq!(after.knockout, before.knockout);
    assert_eq!(after.schedule, before.schedule);
    assert_eq!(after.history, before.history);
    assert_eq!(store.state().matches.len(), 6);
}

#[test]
fn failed_transaction_leaves_state_untouched() {
    let (mut store, ids) = store_with_teams(2);
    let state_before = store.state().clone();
    let versions_before = store.versions();

    let result = store.transact(|t| {
        t.set_current_matchday(7);
        t.add_knockout_match(Round::Final, Some(ids[0]), Some(ids[0]), None, None)
    });
    assert_eq!(result.map(|m| m.id), Err(TournamentError::DuplicateTeamSlots));
    assert_eq!(store.state(), &state_before);
    assert_eq!(store.versions(), versions_before);
}

#[test]
fn save_and_load_round_trip() {
    let dir = temp_dir();
    let (mut store, ids) = store_with_teams(3);
    store
        .transact(|t| {
            t.assign_group("A", ids.clone())?;
            t.generate_all_fixtures(LegMode::Double)?;
            t.add_knockout_match(Round::Final, Some(ids[0]), None, None, Some("Winner SF2".into()))?;
            t.start_matchday(48.0, chrono::Utc::now())?;
            Ok::<_, TournamentError>(())
        })
        .unwrap();
    assert!(store.is_dirty());
    store.save_to_dir(&dir).unwrap();
    assert!(!store.is_dirty());

    let loaded = TournamentStore::load_from_dir(&dir).unwrap().unwrap();
    assert_eq!(loaded.state(), store.state());
    assert_eq!(loaded.versions(), store.versions());
    assert!(!loaded.is_dirty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_directory_loads_nothing() {
    let dir = temp_dir();
    assert!(TournamentStore::load_from_dir(&dir).unwrap().is_none());
}

#[test]
fn corrupt_record_is_reported_by_name() {
    let dir = temp_dir();
    let (mut store, _) = store_with_teams(1);
    store.save_to_dir(&dir).unwrap();
    std::fs::write(dir.join("knockout.json"), "{ not json").unwrap();

    match TournamentStore::load_from_dir(&dir) {
        Err(StoreError::Json { record, .. }) => assert_eq!(record, "knockout"),
        other => panic!("expected a knockout record error, got {:?}", other.map(|s| s.map(|s| s.versions()))),
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap()
}

/// Four teams in group A with single-leg fixtures and matchday 1 running for an hour.
fn store_with_running_matchday() -> (TournamentStore, Vec<MatchId>) {
    let (mut store, ids) = store_with_teams(4);
    store
        .transact(|t| {
            t.assign_group("A", ids.clone())?;
            t.generate_all_fixtures(LegMode::Single)?;
            t.start_matchday(1.0, kickoff())?;
            Ok::<_, TournamentError>(())
        })
        .unwrap();
    let day_one = store.state().matches_on_matchday(1).map(|m| m.id).collect();
    (store, day_one)
}

#[test]
fn activity_survives_save_and_load() {
    let dir = temp_dir();
    let (mut store, day_one) = store_with_running_matchday();
    store
        .record_activity(day_one[0], Side::A, kickoff() + Duration::minutes(5))
        .unwrap();
    store.save_to_dir(&dir).unwrap();

    let mut reloaded = TournamentStore::load_from_dir(&dir).unwrap().unwrap();
    assert_eq!(reloaded.activity(), store.activity());
    assert_eq!(reloaded.versions(), store.versions());

    // The other side shows up after the restart: both were active, so no walkover.
    reloaded
        .record_activity(day_one[0], Side::B, kickoff() + Duration::minutes(20))
        .unwrap();
    let report = reloaded.check_and_resolve_timeouts(kickoff() + Duration::minutes(61), false);
    assert_eq!(report.processed_count, 0);
    assert!(report.needs_review.contains(&day_one[0]));
    assert_eq!(
        reloaded.state().get_match(day_one[0]).unwrap().status,
        MatchStatus::Scheduled
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn activity_for_unknown_match_is_rejected() {
    let (mut store, _) = store_with_running_matchday();
    let before = store.versions();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        store.record_activity(missing, Side::A, kickoff()),
        Err(TournamentError::MatchNotFound(missing))
    );
    assert!(store.activity().is_empty());
    assert_eq!(store.versions(), before);
}

#[test]
fn regenerating_fixtures_drops_stale_activity() {
    let (mut store, day_one) = store_with_running_matchday();
    store.record_activity(day_one[0], Side::A, kickoff()).unwrap();
    store.record_activity(day_one[1], Side::B, kickoff()).unwrap();
    let before = store.versions().activity;

    store
        .transact(|t| t.generate_all_fixtures(LegMode::Double))
        .unwrap();
    assert!(store.activity().is_empty());
    assert_eq!(store.versions().activity, before + 1);
}

#[test]
fn walkover_clears_activity_of_decided_match() {
    let (mut store, day_one) = store_with_running_matchday();
    store
        .record_activity(day_one[1], Side::B, kickoff() + Duration::minutes(1))
        .unwrap();
    store
        .record_activity(day_one[0], Side::A, kickoff() + Duration::minutes(2))
        .unwrap();
    store
        .record_activity(day_one[0], Side::B, kickoff() + Duration::minutes(3))
        .unwrap();

    let report = store.check_and_resolve_timeouts(kickoff() + Duration::minutes(61), false);
    assert_eq!(report.resolved, vec![day_one[1]]);
    assert_eq!(report.needs_review, vec![day_one[0]]);

    let signals = store.activity().signals_since(None);
    assert_eq!(signals.get(&day_one[1]), None);
    assert_eq!(
        signals.get(&day_one[0]),
        Some(&ActivitySignal { team_a: true, team_b: true })
    );
}

fn add_late_entry(store: &mut TournamentStore) -> Result<TeamId, StoreError> {
    let id = store
        .transact(|t| t.add_team("Late Entry", None).map(|team| team.id))
        .unwrap();
    Ok(id)
}

#[test]
fn failed_save_keeps_previous_state() {
    let blocker = temp_dir();
    std::fs::write(&blocker, "not a directory").unwrap();
    let (mut store, _) = store_with_teams(2);
    let state_before = store.state().clone();
    let versions_before = store.versions();

    let result = store.commit_to_dir(&blocker, add_late_entry);
    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(store.state(), &state_before);
    assert_eq!(store.versions(), versions_before);
    assert!(store.is_dirty());

    let dir = temp_dir();
    let id = store.commit_to_dir(&dir, add_late_entry).unwrap();
    assert!(!store.is_dirty());
    let loaded = TournamentStore::load_from_dir(&dir).unwrap().unwrap();
    assert!(loaded.state().get_team(id).is_some());

    std::fs::remove_file(&blocker).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
}
