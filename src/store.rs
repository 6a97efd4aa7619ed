//! Versioned record store around the tournament aggregate.
//!
//! The aggregate is kept as six independently versioned records (meta, teams,
//! fixtures, knockout, schedule, history), plus the match activity log, each saved
//! to its own JSON file, so a failed write of one record never damages another.

use crate::logic::{ActivityLog, WalkoverReport};
use crate::models::{
    GroupId, KnockoutStage, Match, MatchId, ScheduleSettings, SeasonHistory, Side, Team, TeamId,
    Tournament, TournamentError, TournamentId, TournamentMode,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Errors while saving or loading records.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json { record: &'static str, source: serde_json::Error },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Storage I/O error: {}", e),
            StoreError::Json { record, source } => {
                write!(f, "Corrupt {} record: {}", record, source)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Version of each record. A version goes up by one per committed transaction
/// that changed the record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordVersions {
    pub meta: u64,
    pub teams: u64,
    pub fixtures: u64,
    pub knockout: u64,
    pub schedule: u64,
    pub history: u64,
    pub activity: u64,
}

/// On-disk shape of a record.
#[derive(Serialize, Deserialize)]
struct Versioned<T> {
    version: u64,
    value: T,
}

#[derive(Serialize, Deserialize)]
struct Meta {
    id: TournamentId,
    name: String,
    mode: TournamentMode,
}

#[derive(Default, Serialize, Deserialize)]
struct Fixtures {
    groups: BTreeMap<GroupId, Vec<TeamId>>,
    matches: Vec<Match>,
}

const META: &str = "meta";
const TEAMS: &str = "teams";
const FIXTURES: &str = "fixtures";
const KNOCKOUT: &str = "knockout";
const SCHEDULE: &str = "schedule";
const HISTORY: &str = "history";
const ACTIVITY: &str = "activity";

/// Owner of the tournament state. Every mutation goes through [`TournamentStore::transact`].
#[derive(Clone, Debug)]
pub struct TournamentStore {
    state: Tournament,
    activity: ActivityLog,
    versions: RecordVersions,
    /// Versions last written by `save_to_dir`.
    saved: RecordVersions,
}

impl TournamentStore {
    pub fn new(state: Tournament) -> Self {
        let versions = RecordVersions {
            meta: 1,
            teams: 1,
            fixtures: 1,
            knockout: 1,
            schedule: 1,
            history: 1,
            activity: 1,
        };
        Self {
            state,
            activity: ActivityLog::new(),
            versions,
            saved: RecordVersions::default(),
        }
    }

    /// Current state (read-only; mutate through `transact`).
    pub fn state(&self) -> &Tournament {
        &self.state
    }

    /// Match activity reported so far.
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn versions(&self) -> RecordVersions {
        self.versions
    }

    /// Whether some record changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.versions != self.saved
    }

    /// Run `op` on a copy of the state and commit it only if `op` succeeds. On
    /// error the stored state and versions are unchanged. Activity of matches
    /// that are gone or finished afterwards is dropped.
    pub fn transact<T, E>(
        &mut self,
        op: impl FnOnce(&mut Tournament) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut draft = self.state.clone();
        let out = op(&mut draft)?;

        let old = &self.state;
        let v = &mut self.versions;
        if (old.id, &old.name, old.mode) != (draft.id, &draft.name, draft.mode) {
            v.meta += 1;
        }
        if old.teams != draft.teams {
            v.teams += 1;
        }
        if old.groups != draft.groups || old.matches != draft.matches {
            v.fixtures += 1;
            if self.activity.prune(&draft.matches) {
                v.activity += 1;
            }
        }
        if old.knockout != draft.knockout {
            v.knockout += 1;
        }
        if old.schedule != draft.schedule {
            v.schedule += 1;
        }
        if old.history != draft.history {
            v.history += 1;
        }
        self.state = draft;
        Ok(out)
    }

    /// Apply `change` to a copy of the store and save the copy to `dir`. The copy
    /// replaces the store only when both succeed, so a failed save never leaves
    /// unsaved changes visible.
    pub fn commit_to_dir<T, E>(
        &mut self,
        dir: &Path,
        change: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut next = self.clone();
        let out = change(&mut next)?;
        if let Err(e) = next.save_to_dir(dir) {
            // Some records may already hold the copy's contents; write all of
            // ours again on the next save.
            self.saved = RecordVersions::default();
            return Err(e.into());
        }
        *self = next;
        Ok(out)
    }

    /// Note activity of one side of an existing match.
    pub fn record_activity(
        &mut self,
        match_id: MatchId,
        side: Side,
        at: DateTime<Utc>,
    ) -> Result<(), TournamentError> {
        if self.state.get_match(match_id).is_none() {
            return Err(TournamentError::MatchNotFound(match_id));
        }
        self.activity.record(match_id, side, at);
        self.versions.activity += 1;
        Ok(())
    }

    /// Walkover check fed by the stored activity of the current window.
    pub fn check_and_resolve_timeouts(&mut self, now: DateTime<Utc>, force: bool) -> WalkoverReport {
        let signals = self
            .activity
            .signals_since(self.state.schedule.matchday_start_time());
        let checked = self.transact(|t| {
            Ok::<_, Infallible>(t.check_and_resolve_timeouts(&signals, now, force))
        });
        match checked {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Write every record whose version changed since the last save.
    pub fn save_to_dir(&mut self, dir: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(dir)?;
        let (v, s, t) = (self.versions, self.saved, &self.state);

        if v.meta != s.meta {
            let meta = Meta {
                id: t.id,
                name: t.name.clone(),
                mode: t.mode,
            };
            write_record(dir, META, v.meta, &meta)?;
            self.saved.meta = v.meta;
        }
        if v.teams != s.teams {
            write_record(dir, TEAMS, v.teams, &t.teams)?;
            self.saved.teams = v.teams;
        }
        if v.fixtures != s.fixtures {
            let fixtures = Fixtures {
                groups: t.groups.clone(),
                matches: t.matches.clone(),
            };
            write_record(dir, FIXTURES, v.fixtures, &fixtures)?;
            self.saved.fixtures = v.fixtures;
        }
        if v.knockout != s.knockout {
            write_record(dir, KNOCKOUT, v.knockout, &t.knockout)?;
            self.saved.knockout = v.knockout;
        }
        if v.schedule != s.schedule {
            write_record(dir, SCHEDULE, v.schedule, &t.schedule)?;
            self.saved.schedule = v.schedule;
        }
        if v.history != s.history {
            write_record(dir, HISTORY, v.history, &t.history)?;
            self.saved.history = v.history;
        }
        if v.activity != s.activity {
            write_record(dir, ACTIVITY, v.activity, &self.activity)?;
            self.saved.activity = v.activity;
        }
        log::debug!("Saved tournament records to {}", dir.display());
        Ok(())
    }

    /// Load a store from `dir`. Returns None when no tournament was saved there.
    /// Missing collection records load as empty.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>, StoreError> {
        let Some(meta) = read_record::<Meta>(dir, META)? else {
            return Ok(None);
        };
        let teams = read_record::<Vec<Team>>(dir, TEAMS)?;
        let fixtures = read_record::<Fixtures>(dir, FIXTURES)?;
        let knockout = read_record::<KnockoutStage>(dir, KNOCKOUT)?;
        let schedule = read_record::<ScheduleSettings>(dir, SCHEDULE)?;
        let history = read_record::<Vec<SeasonHistory>>(dir, HISTORY)?;
        let activity = read_record::<ActivityLog>(dir, ACTIVITY)?;

        let versions = RecordVersions {
            meta: meta.version,
            teams: teams.as_ref().map_or(0, |r| r.version),
            fixtures: fixtures.as_ref().map_or(0, |r| r.version),
            knockout: knockout.as_ref().map_or(0, |r| r.version),
            schedule: schedule.as_ref().map_or(0, |r| r.version),
            history: history.as_ref().map_or(0, |r| r.version),
            activity: activity.as_ref().map_or(0, |r| r.version),
        };
        let fixtures = fixtures.map(|r| r.value).unwrap_or_default();
        let mut state = Tournament::new(meta.value.name, meta.value.mode);
        state.id = meta.value.id;
        state.teams = teams.map(|r| r.value).unwrap_or_default();
        state.groups = fixtures.groups;
        state.matches = fixtures.matches;
        state.knockout = knockout.map(|r| r.value).unwrap_or_default();
        state.schedule = schedule.map(|r| r.value).unwrap_or_default();
        state.history = history.map(|r| r.value).unwrap_or_default();

        Ok(Some(Self {
            state,
            activity: activity.map(|r| r.value).unwrap_or_default(),
            versions,
            saved: versions,
        }))
    }
}

fn record_path(dir: &Path, name: &str) -> std::path::PathBuf {
    dir.join(format!("{}.json", name))
}

/// Write through a temporary file and rename, so a crash mid-write leaves the
/// previous version in place.
fn write_record<T: Serialize>(
    dir: &Path,
    name: &'static str,
    version: u64,
    value: &T,
) -> Result<(), StoreError> {
    let path = record_path(dir, name);
    let tmp = dir.join(format!("{}.json.tmp", name));
    {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &Versioned { version, value })
            .map_err(|source| StoreError::Json { record: name, source })?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp, &path)?;
    Ok(())
}

fn read_record<T: DeserializeOwned>(
    dir: &Path,
    name: &'static str,
) -> Result<Option<Versioned<T>>, StoreError> {
    let file = match File::open(record_path(dir, name)) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| StoreError::Json { record: name, source })
}
