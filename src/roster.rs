//! Roster import from CSV (`name,logo` with a header row).

use crate::models::{TeamId, Tournament, TournamentError};
use serde::Deserialize;
use std::io;

/// One row of a roster file.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Errors while importing a roster.
#[derive(Debug)]
pub enum RosterError {
    Csv(csv::Error),
    /// Row `line` (1-based, counting the header) was rejected.
    Team { line: usize, error: TournamentError },
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::Csv(e) => write!(f, "Invalid roster CSV: {}", e),
            RosterError::Team { line, error } => write!(f, "Line {}: {}", line, error),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<csv::Error> for RosterError {
    fn from(e: csv::Error) -> Self {
        RosterError::Csv(e)
    }
}

/// Parse roster rows. Fields are trimmed; an empty logo column reads as None.
pub fn parse_roster<R: io::Read>(reader: R) -> Result<Vec<RosterEntry>, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut entries = Vec::new();
    for row in rdr.deserialize::<RosterEntry>() {
        entries.push(row?);
    }
    Ok(entries)
}

impl Tournament {
    /// Add every team of a roster file. All or nothing: if any row is rejected
    /// (blank or duplicate name) the roster is left as it was.
    pub fn import_roster<R: io::Read>(&mut self, reader: R) -> Result<Vec<TeamId>, RosterError> {
        let entries = parse_roster(reader)?;
        let backup = self.teams.clone();
        let mut added = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            match self.add_team(entry.name, entry.logo) {
                Ok(team) => added.push(team.id),
                Err(error) => {
                    self.teams = backup;
                    return Err(RosterError::Team { line: i + 2, error });
                }
            }
        }
        log::info!("Imported {} team(s) from roster", added.len());
        Ok(added)
    }
}
