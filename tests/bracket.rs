//! Integration tests for the knockout bracket.

use tournament_progression::{
    FinalOutcome, KnockoutMatchUpdate, Round, Side, Slot, TeamId, Tournament, TournamentError,
    TournamentMode,
};
use uuid::Uuid;

fn tournament_with_teams(n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Test Cup", TournamentMode::Knockout);
    let ids = (0..n)
        .map(|i| t.add_team(format!("Team {i}"), None).unwrap().id)
        .collect();
    (t, ids)
}

#[test]
fn slots_are_team_placeholder_or_empty() {
    let (mut t, ids) = tournament_with_teams(2);

    let m = t
        .add_knockout_match(
            Round::QuarterFinal,
            Some(ids[0]),
            None,
            Some("ignored".into()),
            Some("Winner R16-2".into()),
        )
        .unwrap();
    assert_eq!(m.slot_a, Slot::Team(ids[0]));
    assert_eq!(m.slot_b, Slot::Placeholder("Winner R16-2".into()));
    assert_eq!(m.match_order, 1);

    let m = t
        .add_knockout_match(Round::QuarterFinal, None, None, Some("   ".into()), None)
        .unwrap();
    assert_eq!(m.slot_a, Slot::Empty);
    assert_eq!(m.slot_b, Slot::Empty);
    assert_eq!(m.match_order, 2);
    assert_eq!(t.knockout.round(Round::QuarterFinal).len(), 2);
}

#[test]
fn same_team_on_both_sides_is_rejected() {
    let (mut t, ids) = tournament_with_teams(2);
    assert_eq!(
        t.add_knockout_match(Round::SemiFinal, Some(ids[0]), Some(ids[0]), None, None),
        Err(TournamentError::DuplicateTeamSlots)
    );
    assert!(t.knockout.is_empty());

    let m = t
        .add_knockout_match(Round::SemiFinal, Some(ids[0]), Some(ids[1]), None, None)
        .unwrap();
    let update = KnockoutMatchUpdate {
        team_b: Some(ids[0]),
        ..Default::default()
    };
    assert_eq!(
        t.update_knockout_match(m.id, update),
        Err(TournamentError::DuplicateTeamSlots)
    );
    assert_eq!(t.knockout.get(m.id), Some(&m));
}

#[test]
fn unknown_team_is_rejected() {
    let (mut t, _) = tournament_with_teams(1);
    let stranger = Uuid::new_v4();
    assert_eq!(
        t.add_knockout_match(Round::Final, Some(stranger), None, None, None),
        Err(TournamentError::TeamNotFound(stranger))
    );
}

#[test]
fn setting_one_slot_kind_clears_the_other() {
    let (mut t, ids) = tournament_with_teams(3);
    let m = t
        .add_knockout_match(Round::SemiFinal, None, Some(ids[1]), Some("Winner QF1".into()), None)
        .unwrap();

    let m = t
        .update_knockout_match(
            m.id,
            KnockoutMatchUpdate {
                team_a: Some(ids[0]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(m.slot_a, Slot::Team(ids[0]));
    assert_eq!(m.slot_a.placeholder_text(), None);
    assert_eq!(m.slot_b, Slot::Team(ids[1]), "untouched side keeps its slot");

    let m = t
        .update_knockout_match(
            m.id,
            KnockoutMatchUpdate {
                placeholder_b: Some("Winner QF4".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(m.slot_b, Slot::Placeholder("Winner QF4".into()));
    assert_eq!(m.slot_b.team(), None);

    let m = t
        .update_knockout_match(
            m.id,
            KnockoutMatchUpdate {
                clear_slot_a: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(m.slot_a.is_empty());
}

#[test]
fn match_order_edit_reorders_round() {
    let (mut t, _) = tournament_with_teams(0);
    let first = t
        .add_knockout_match(Round::QuarterFinal, None, None, Some("A1".into()), Some("B2".into()))
        .unwrap();
    let second = t
        .add_knockout_match(Round::QuarterFinal, None, None, Some("B1".into()), Some("A2".into()))
        .unwrap();

    t.update_knockout_match(
        first.id,
        KnockoutMatchUpdate {
            match_order: Some(5),
            ..Default::default()
        },
    )
    .unwrap();

    let order: Vec<_> = t.knockout.round(Round::QuarterFinal).iter().map(|m| m.id).collect();
    assert_eq!(order, vec![second.id, first.id]);
    assert_eq!(t.knockout.next_match_order(Round::QuarterFinal), 6);
}

#[test]
fn final_winner_decides_champion_and_runner_up() {
    let (mut t, ids) = tournament_with_teams(2);
    let final_match = t
        .add_knockout_match(Round::Final, Some(ids[0]), Some(ids[1]), None, None)
        .unwrap();
    assert_eq!(t.final_outcome(), None);

    let decided = t.record_knockout_winner(final_match.id, ids[1]).unwrap();
    assert_eq!(decided.winner, Some(ids[1]));
    assert_eq!(
        t.final_outcome(),
        Some(FinalOutcome {
            champion: ids[1],
            runner_up: Some(ids[0]),
        })
    );
}

#[test]
fn winner_must_play_in_the_match() {
    let (mut t, ids) = tournament_with_teams(3);
    let m = t
        .add_knockout_match(Round::SemiFinal, Some(ids[0]), None, None, Some("Winner QF2".into()))
        .unwrap();
    assert_eq!(
        t.record_knockout_winner(m.id, ids[2]),
        Err(TournamentError::WinnerNotInMatch)
    );
    let missing = Uuid::new_v4();
    assert_eq!(
        t.record_knockout_winner(missing, ids[0]),
        Err(TournamentError::KnockoutMatchNotFound(missing))
    );
    assert_eq!(t.knockout.get(m.id).unwrap().winner, None);
}

#[test]
fn winners_move_forward_only_when_propagated() {
    let (mut t, ids) = tournament_with_teams(4);
    let sf1 = t
        .add_knockout_match(Round::SemiFinal, Some(ids[0]), Some(ids[1]), None, None)
        .unwrap();
    let sf2 = t
        .add_knockout_match(Round::SemiFinal, Some(ids[2]), Some(ids[3]), None, None)
        .unwrap();
    let final_match = t
        .add_knockout_match(
            Round::Final,
            None,
            None,
            Some(sf1.winner_label()),
            Some(sf2.winner_label()),
        )
        .unwrap();
    assert_eq!(final_match.slot_a, Slot::Placeholder("Winner SF1".into()));

    t.record_knockout_winner(sf1.id, ids[0]).unwrap();
    assert_eq!(
        t.knockout.get(final_match.id).unwrap().slot_a,
        Slot::Placeholder("Winner SF1".into())
    );

    assert_eq!(
        t.propagate_winner(sf2.id, final_match.id, Side::B),
        Err(TournamentError::WinnerNotDecided)
    );
    let updated = t.propagate_winner(sf1.id, final_match.id, Side::A).unwrap();
    assert_eq!(updated.slot_a, Slot::Team(ids[0]));
    assert_eq!(updated.slot_b, Slot::Placeholder("Winner SF2".into()));
}

#[test]
fn editing_out_the_winner_clears_it() {
    let (mut t, ids) = tournament_with_teams(3);
    let m = t
        .add_knockout_match(Round::Final, Some(ids[0]), Some(ids[1]), None, None)
        .unwrap();
    t.record_knockout_winner(m.id, ids[0]).unwrap();

    let m = t
        .update_knockout_match(
            m.id,
            KnockoutMatchUpdate {
                team_a: Some(ids[2]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(m.winner, None);
    assert_eq!(t.final_outcome(), None);
}

#[test]
fn removing_a_match() {
    let (mut t, ids) = tournament_with_teams(2);
    let m = t
        .add_knockout_match(Round::Final, Some(ids[0]), Some(ids[1]), None, None)
        .unwrap();
    assert_eq!(t.remove_knockout_match(m.id).map(|r| r.id), Ok(m.id));
    assert!(t.knockout.is_empty());
    assert_eq!(
        t.remove_knockout_match(m.id),
        Err(TournamentError::KnockoutMatchNotFound(m.id))
    );
}

#[test]
fn slot_serializes_as_tagged_variant() {
    let id = Uuid::nil();
    assert_eq!(
        serde_json::to_value(Slot::Team(id)).unwrap(),
        serde_json::json!({ "kind": "team", "value": id })
    );
    assert_eq!(
        serde_json::to_value(Slot::Placeholder("Winner QF1".into())).unwrap(),
        serde_json::json!({ "kind": "placeholder", "value": "Winner QF1" })
    );
    assert_eq!(
        serde_json::to_value(Slot::Empty).unwrap(),
        serde_json::json!({ "kind": "empty" })
    );
}
