//! Tournament progression engine: group fixtures, knockout bracket, matchday timer
//! with automatic walkovers, and season archival.
//!
//! The engine does no I/O of its own: operations act on a [`Tournament`] value and
//! take the current time as a parameter. [`TournamentStore`] adds transactions and
//! per-record JSON persistence for callers that want them.

pub mod logic;
pub mod models;
pub mod roster;
pub mod store;

pub use logic::{
    check_and_resolve_timeouts, draw_groups, generate_fixtures, group_label, round_robin_rounds,
    shuffle_seeding, ActivityLog, ActivitySignal, ActivitySource, KnockoutMatchUpdate, LegMode,
    WalkoverReport, WALKOVER_SCORE,
};
pub use models::{
    FinalOutcome, GroupId, KnockoutMatch, KnockoutMatchId, KnockoutStage, Match, MatchId,
    MatchStatus, Round, ScheduleSettings, SeasonHistory, SeasonId, Side, Slot, Team, TeamDirectory,
    TeamId, Tournament, TournamentError, TournamentId, TournamentMode, DEFAULT_MATCHDAY_HOURS,
};
pub use roster::{parse_roster, RosterEntry, RosterError};
pub use store::{RecordVersions, StoreError, TournamentStore};
