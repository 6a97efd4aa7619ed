//! Knockout bracket: adding and editing matches, recording winners.
//!
//! The bracket is a flexible container. Placeholder text is stored as given and is
//! never checked against earlier rounds; winners only move to a later match when
//! [`Tournament::propagate_winner`] is called for it.

use crate::models::{
    FinalOutcome, KnockoutMatch, KnockoutMatchId, Round, Side, Slot, TeamId, Tournament,
    TournamentError,
};
use serde::Deserialize;

/// Edit of an existing knockout match. For each side, leaving both the team and the
/// placeholder as `None` keeps the slot as it is; `clear_slot_*` empties it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct KnockoutMatchUpdate {
    #[serde(default)]
    pub team_a: Option<TeamId>,
    #[serde(default)]
    pub placeholder_a: Option<String>,
    #[serde(default)]
    pub clear_slot_a: bool,
    #[serde(default)]
    pub team_b: Option<TeamId>,
    #[serde(default)]
    pub placeholder_b: Option<String>,
    #[serde(default)]
    pub clear_slot_b: bool,
    #[serde(default)]
    pub match_order: Option<u32>,
}

/// New slot for one side of an update, or None to keep the current one.
fn updated_slot(team: Option<TeamId>, placeholder: Option<String>, clear: bool) -> Option<Slot> {
    if clear {
        Some(Slot::Empty)
    } else if team.is_some() || placeholder.is_some() {
        Some(Slot::from_parts(team, placeholder))
    } else {
        None
    }
}

impl Tournament {
    /// Team slots must name roster teams, and not the same team twice.
    fn validate_slots(&self, slot_a: &Slot, slot_b: &Slot) -> Result<(), TournamentError> {
        for id in [slot_a.team(), slot_b.team()].into_iter().flatten() {
            self.require_team(id)?;
        }
        if slot_a.team().is_some() && slot_a.team() == slot_b.team() {
            return Err(TournamentError::DuplicateTeamSlots);
        }
        Ok(())
    }

    /// Add a match at the end of `round`. Each side is a team, a placeholder, or
    /// empty when neither is given; a team wins over a placeholder.
    pub fn add_knockout_match(
        &mut self,
        round: Round,
        team_a: Option<TeamId>,
        team_b: Option<TeamId>,
        placeholder_a: Option<String>,
        placeholder_b: Option<String>,
    ) -> Result<KnockoutMatch, TournamentError> {
        let slot_a = Slot::from_parts(team_a, placeholder_a);
        let slot_b = Slot::from_parts(team_b, placeholder_b);
        self.validate_slots(&slot_a, &slot_b)?;

        let order = self.knockout.next_match_order(round);
        let m = KnockoutMatch::new(round, order, slot_a, slot_b);
        log::info!("Added knockout match {} ({} #{})", m.id, round, order);
        self.knockout.insert(m.clone());
        Ok(m)
    }

    /// Edit slots and/or match order. A recorded winner that no longer plays in
    /// the match is cleared.
    pub fn update_knockout_match(
        &mut self,
        match_id: KnockoutMatchId,
        update: KnockoutMatchUpdate,
    ) -> Result<KnockoutMatch, TournamentError> {
        let current = self
            .knockout
            .get(match_id)
            .ok_or(TournamentError::KnockoutMatchNotFound(match_id))?;
        let slot_a = updated_slot(update.team_a, update.placeholder_a, update.clear_slot_a)
            .unwrap_or_else(|| current.slot_a.clone());
        let slot_b = updated_slot(update.team_b, update.placeholder_b, update.clear_slot_b)
            .unwrap_or_else(|| current.slot_b.clone());
        self.validate_slots(&slot_a, &slot_b)?;

        let m = self
            .knockout
            .get_mut(match_id)
            .ok_or(TournamentError::KnockoutMatchNotFound(match_id))?;
        m.slot_a = slot_a;
        m.slot_b = slot_b;
        if let Some(order) = update.match_order {
            m.match_order = order;
        }
        if let Some(w) = m.winner {
            if !m.contains_team(w) {
                log::warn!("Winner of knockout match {} no longer in a slot; cleared", match_id);
                m.winner = None;
            }
        }
        let updated = m.clone();
        self.knockout.sort_round(updated.round);
        Ok(updated)
    }

    /// Record the winner of a knockout match. The winner must be one of the two
    /// slot teams. Recording the Final decides champion and runner-up.
    pub fn record_knockout_winner(
        &mut self,
        match_id: KnockoutMatchId,
        winner: TeamId,
    ) -> Result<KnockoutMatch, TournamentError> {
        let m = self
            .knockout
            .get_mut(match_id)
            .ok_or(TournamentError::KnockoutMatchNotFound(match_id))?;
        if !m.contains_team(winner) {
            return Err(TournamentError::WinnerNotInMatch);
        }
        m.winner = Some(winner);
        let m = m.clone();
        if m.round == Round::Final {
            log::info!("Final decided: champion {}, runner-up {:?}", winner, m.loser());
        } else {
            log::info!("Knockout match {} won by {}", match_id, winner);
        }
        Ok(m)
    }

    /// Copy the winner of `from` into one side of `to`. This is the only way a
    /// result moves forward in the bracket.
    pub fn propagate_winner(
        &mut self,
        from: KnockoutMatchId,
        to: KnockoutMatchId,
        side: Side,
    ) -> Result<KnockoutMatch, TournamentError> {
        let winner = self
            .knockout
            .get(from)
            .ok_or(TournamentError::KnockoutMatchNotFound(from))?
            .winner
            .ok_or(TournamentError::WinnerNotDecided)?;
        let update = match side {
            Side::A => KnockoutMatchUpdate {
                team_a: Some(winner),
                ..Default::default()
            },
            Side::B => KnockoutMatchUpdate {
                team_b: Some(winner),
                ..Default::default()
            },
        };
        self.update_knockout_match(to, update)
    }

    pub fn remove_knockout_match(
        &mut self,
        match_id: KnockoutMatchId,
    ) -> Result<KnockoutMatch, TournamentError> {
        self.knockout
            .remove(match_id)
            .ok_or(TournamentError::KnockoutMatchNotFound(match_id))
    }

    /// Champion and runner-up from the Final, if it has been decided.
    pub fn final_outcome(&self) -> Option<FinalOutcome> {
        self.knockout.final_outcome()
    }
}
