//! Group draw and seeding shuffle before fixture generation.

use crate::models::{GroupId, TeamId, Tournament, TournamentError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Label for the i-th group: A, B, ..., Z, AA, ..., ZZ, AAA, ... (spreadsheet
/// column style, so every index gets a distinct label).
pub fn group_label(index: usize) -> GroupId {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.into_iter().rev().collect()
}

/// Shuffle `teams` and deal them round the groups like cards, so group sizes
/// differ by at most one.
pub fn draw_groups<R: Rng + ?Sized>(
    teams: &[TeamId],
    group_count: usize,
    rng: &mut R,
) -> Result<BTreeMap<GroupId, Vec<TeamId>>, TournamentError> {
    if group_count == 0 {
        return Err(TournamentError::InvalidGroupCount);
    }
    if teams.len() / 2 < group_count {
        // The last dealt group is the smallest.
        return Err(TournamentError::InsufficientTeams {
            group: group_label(group_count - 1),
        });
    }

    let mut pool = teams.to_vec();
    pool.shuffle(rng);

    let mut groups: BTreeMap<GroupId, Vec<TeamId>> =
        (0..group_count).map(|i| (group_label(i), Vec::new())).collect();
    for (i, id) in pool.into_iter().enumerate() {
        if let Some(members) = groups.get_mut(&group_label(i % group_count)) {
            members.push(id);
        }
    }
    Ok(groups)
}

/// Shuffle the seeding order inside each group (changes who meets whom on which
/// matchday, not who is in the group).
pub fn shuffle_seeding<R: Rng + ?Sized>(groups: &mut BTreeMap<GroupId, Vec<TeamId>>, rng: &mut R) {
    for members in groups.values_mut() {
        members.shuffle(rng);
    }
}

impl Tournament {
    /// Shuffle seeding of the named groups only; unknown names are ignored.
    pub fn shuffle_group_seeding<R: Rng + ?Sized>(&mut self, groups: &[GroupId], rng: &mut R) {
        for group in groups {
            if let Some(members) = self.groups.get_mut(group) {
                members.shuffle(rng);
            }
        }
    }

    /// Draw the whole roster into `group_count` groups, replacing existing groups.
    /// Fixtures are not touched; generate them afterwards.
    pub fn draw_groups<R: Rng + ?Sized>(
        &mut self,
        group_count: usize,
        rng: &mut R,
    ) -> Result<&BTreeMap<GroupId, Vec<TeamId>>, TournamentError> {
        let ids: Vec<TeamId> = self.teams.iter().map(|t| t.id).collect();
        self.groups = draw_groups(&ids, group_count, rng)?;
        log::info!("Drew {} team(s) into {} group(s)", ids.len(), group_count);
        Ok(&self.groups)
    }
}
