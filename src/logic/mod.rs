//! Tournament business logic: fixtures, bracket, matchday timer, walkovers, archive.

mod archive;
mod bracket;
mod draw;
mod fixtures;
mod scheduler;
mod walkover;

pub use bracket::KnockoutMatchUpdate;
pub use draw::{draw_groups, group_label, shuffle_seeding};
pub use fixtures::{generate_fixtures, round_robin_rounds, LegMode};
pub use walkover::{
    check_and_resolve_timeouts, ActivityLog, ActivitySignal, ActivitySource, WalkoverReport,
    WALKOVER_SCORE,
};
