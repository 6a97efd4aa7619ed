//! Team and the team directory lookup used by the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a team (used in matches, slots and history).
pub type TeamId = Uuid;

/// A team in the tournament roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Logo reference (URL or asset key), if any.
    #[serde(default)]
    pub logo: Option<String>,
}

impl Team {
    /// Create a new team with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            logo: None,
        }
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }
}

/// Lookup of teams by id. Implemented for roster slices and id maps so callers can
/// hand the engine whatever they loaded.
pub trait TeamDirectory {
    fn team(&self, id: TeamId) -> Option<&Team>;

    /// Display name for a team, falling back to the id when the team is unknown.
    fn display_name(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

impl TeamDirectory for [Team] {
    fn team(&self, id: TeamId) -> Option<&Team> {
        self.iter().find(|t| t.id == id)
    }
}

impl TeamDirectory for Vec<Team> {
    fn team(&self, id: TeamId) -> Option<&Team> {
        self.as_slice().team(id)
    }
}

impl TeamDirectory for HashMap<TeamId, Team> {
    fn team(&self, id: TeamId) -> Option<&Team> {
        self.get(&id)
    }
}
