//! Data structures for the tournament: teams, fixtures, bracket, schedule, history.

mod fixture;
mod history;
mod knockout;
mod schedule;
mod team;
mod tournament;

pub use fixture::{GroupId, Match, MatchId, MatchStatus, Side};
pub use history::{SeasonHistory, SeasonId};
pub use knockout::{FinalOutcome, KnockoutMatch, KnockoutMatchId, KnockoutStage, Round, Slot};
pub use schedule::{ScheduleSettings, DEFAULT_MATCHDAY_HOURS};
pub use team::{Team, TeamDirectory, TeamId};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentMode};
