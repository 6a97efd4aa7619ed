//! Single binary admin service: JSON REST API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Environment overrides:
//! HOST, PORT, DATA_DIR, WALKOVER_CHECK_INTERVAL_SECS, TOURNAMENT_NAME, TOURNAMENT_MODE.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::RwLock;
use std::time::Duration;
use tournament_progression::{
    ActivitySource, FinalOutcome, GroupId, KnockoutMatchId, KnockoutMatchUpdate, LegMode,
    MatchId, RecordVersions, Round, Side, StoreError, TeamId, Tournament, TournamentError,
    TournamentMode, TournamentStore,
};

/// Service state: the tournament store and where it is saved.
struct ServerState {
    store: TournamentStore,
    data_dir: PathBuf,
}

type AppState = Data<RwLock<ServerState>>;

/// Settings read from the environment.
struct ServerConfig {
    host: String,
    port: u16,
    data_dir: PathBuf,
    walkover_check_interval: Duration,
    tournament_name: String,
    tournament_mode: TournamentMode,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8080),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            walkover_check_interval: Duration::from_secs(
                env_or::<u64>("WALKOVER_CHECK_INTERVAL_SECS", 300).max(1),
            ),
            tournament_name: std::env::var("TOURNAMENT_NAME").unwrap_or_else(|_| "Tournament".to_string()),
            tournament_mode: env_or("TOURNAMENT_MODE", TournamentMode::GroupsAndKnockout),
        }
    }
}

/// Parse an env var, falling back to `default` (with a warning when set but invalid).
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}; using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Snapshot returned by GET /api/tournament.
#[derive(Serialize)]
struct TournamentSnapshot<'a> {
    tournament: &'a Tournament,
    versions: RecordVersions,
    /// Seconds left in the running matchday (negative once expired).
    remaining_seconds: Option<i64>,
    final_outcome: Option<FinalOutcome>,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Deserialize)]
struct DrawGroupsBody {
    group_count: usize,
}

#[derive(Deserialize)]
struct AssignGroupBody {
    team_ids: Vec<TeamId>,
}

#[derive(Deserialize)]
struct GenerateFixturesBody {
    /// Groups to regenerate; all groups when absent.
    #[serde(default)]
    groups: Option<Vec<GroupId>>,
    legs: String,
    /// Must be true: regenerating discards existing fixtures and scores.
    #[serde(default)]
    confirm: bool,
    /// Shuffle seeding inside each group first.
    #[serde(default)]
    shuffle: bool,
}

#[derive(Deserialize)]
struct MatchTeamsBody {
    team_a: TeamId,
    team_b: TeamId,
}

#[derive(Deserialize)]
struct MatchResultBody {
    score_a: u32,
    score_b: u32,
    #[serde(default)]
    proof: Option<String>,
}

#[derive(Deserialize)]
struct ActivityBody {
    side: Side,
}

#[derive(Deserialize)]
struct AddKnockoutBody {
    round: Round,
    #[serde(default)]
    team_a: Option<TeamId>,
    #[serde(default)]
    team_b: Option<TeamId>,
    #[serde(default)]
    placeholder_a: Option<String>,
    #[serde(default)]
    placeholder_b: Option<String>,
}

#[derive(Deserialize)]
struct KnockoutWinnerBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct PropagateBody {
    to: KnockoutMatchId,
    side: Side,
}

#[derive(Deserialize)]
struct StartMatchdayBody {
    duration_hours: f64,
}

#[derive(Deserialize)]
struct SetMatchdayBody {
    matchday: u32,
}

#[derive(Deserialize)]
struct AutoProcessBody {
    enabled: bool,
}

#[derive(Deserialize)]
struct WalkoverCheckBody {
    #[serde(default)]
    force: bool,
}

#[derive(Deserialize)]
struct ArchiveBody {
    season_name: String,
    #[serde(default)]
    champion_id: Option<TeamId>,
    #[serde(default)]
    runner_up_id: Option<TeamId>,
    #[serde(default = "default_retain_roster")]
    retain_roster: bool,
}

fn default_retain_roster() -> bool {
    true
}

#[derive(Deserialize)]
struct TeamPath {
    id: TeamId,
}

#[derive(Deserialize)]
struct GroupPath {
    group: GroupId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct KnockoutPath {
    id: KnockoutMatchId,
}

fn bad_request(e: impl Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

/// Why a store change did not go through.
enum CommitError<E> {
    Rejected(E),
    Save(StoreError),
}

impl<E> From<StoreError> for CommitError<E> {
    fn from(e: StoreError) -> Self {
        CommitError::Save(e)
    }
}

/// Run `change` on the store under one write lock and save it before it becomes
/// visible; reply with its result as JSON.
fn commit<T, E, F>(state: &AppState, change: F) -> HttpResponse
where
    T: Serialize,
    E: Display,
    F: FnOnce(&mut TournamentStore) -> Result<T, CommitError<E>>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ServerState { store, data_dir } = &mut *g;
    match store.commit_to_dir(data_dir, change) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(CommitError::Rejected(e)) => bad_request(e),
        Err(CommitError::Save(e)) => {
            log::error!("Failed to save tournament: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// Run one engine operation as a transaction and reply with its result.
fn apply<T, E, F>(state: &AppState, op: F) -> HttpResponse
where
    T: Serialize,
    E: Display,
    F: FnOnce(&mut Tournament) -> Result<T, E>,
{
    commit(state, |store| store.transact(op).map_err(CommitError::Rejected))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-progression",
    })
}

#[get("/api/tournament")]
async fn api_get_tournament(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = g.store.state();
    HttpResponse::Ok().json(TournamentSnapshot {
        tournament: t,
        versions: g.store.versions(),
        remaining_seconds: t.schedule.remaining(Utc::now()).map(|d| d.num_seconds()),
        final_outcome: t.final_outcome(),
    })
}

#[post("/api/teams")]
async fn api_add_team(state: AppState, body: Json<AddTeamBody>) -> HttpResponse {
    let body = body.into_inner();
    apply(&state, |t| t.add_team(body.name, body.logo).cloned())
}

/// Import teams from a CSV body (`name,logo` header).
#[post("/api/teams/import")]
async fn api_import_teams(state: AppState, body: String) -> HttpResponse {
    apply(&state, |t| t.import_roster(body.as_bytes()))
}

#[delete("/api/teams/{id}")]
async fn api_remove_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    apply(&state, |t| t.remove_team(path.id))
}

#[post("/api/groups/draw")]
async fn api_draw_groups(state: AppState, body: Json<DrawGroupsBody>) -> HttpResponse {
    apply(&state, |t| {
        t.draw_groups(body.group_count, &mut rand::thread_rng())
            .cloned()
    })
}

#[put("/api/groups/{group}")]
async fn api_assign_group(
    state: AppState,
    path: Path<GroupPath>,
    body: Json<AssignGroupBody>,
) -> HttpResponse {
    let path = path.into_inner();
    let body = body.into_inner();
    apply(&state, |t| {
        t.assign_group(path.group, body.team_ids)?;
        Ok::<_, TournamentError>(t.groups.clone())
    })
}

/// Regenerate fixtures. Destructive: existing fixtures and scores of the chosen
/// groups are discarded, so the body must carry `confirm: true`.
#[post("/api/fixtures/generate")]
async fn api_generate_fixtures(state: AppState, body: Json<GenerateFixturesBody>) -> HttpResponse {
    let body = body.into_inner();
    let legs = match LegMode::from_str(&body.legs) {
        Ok(legs) => legs,
        Err(e) => return bad_request(e),
    };
    if !body.confirm {
        return bad_request(
            "Regenerating fixtures discards existing fixtures and scores; resend with confirm=true",
        );
    }
    apply(&state, |t| {
        let groups = body
            .groups
            .unwrap_or_else(|| t.groups.keys().cloned().collect());
        if body.shuffle {
            t.shuffle_group_seeding(&groups, &mut rand::thread_rng());
        }
        t.generate_fixtures(&groups, legs)
    })
}

#[put("/api/matches/{id}/teams")]
async fn api_update_match_teams(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<MatchTeamsBody>,
) -> HttpResponse {
    apply(&state, |t| {
        t.update_match_teams(path.id, body.team_a, body.team_b)
            .cloned()
    })
}

#[put("/api/matches/{id}/result")]
async fn api_record_match_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<MatchResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    apply(&state, |t| {
        t.record_match_result(path.id, body.score_a, body.score_b, body.proof)
            .cloned()
    })
}

/// Report that one side of a match was active in its match room. Replies with the
/// match's activity in the current window.
#[post("/api/matches/{id}/activity")]
async fn api_record_activity(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ActivityBody>,
) -> HttpResponse {
    commit(&state, |store| {
        store
            .record_activity(path.id, body.side, Utc::now())
            .map(|()| {
                let start = store.state().schedule.matchday_start_time();
                store.activity().signals_since(start).activity(path.id)
            })
            .map_err(CommitError::Rejected)
    })
}

#[post("/api/knockout")]
async fn api_add_knockout_match(state: AppState, body: Json<AddKnockoutBody>) -> HttpResponse {
    let body = body.into_inner();
    apply(&state, |t| {
        t.add_knockout_match(
            body.round,
            body.team_a,
            body.team_b,
            body.placeholder_a,
            body.placeholder_b,
        )
    })
}

#[put("/api/knockout/{id}")]
async fn api_update_knockout_match(
    state: AppState,
    path: Path<KnockoutPath>,
    body: Json<KnockoutMatchUpdate>,
) -> HttpResponse {
    let update = body.into_inner();
    apply(&state, |t| t.update_knockout_match(path.id, update))
}

#[delete("/api/knockout/{id}")]
async fn api_remove_knockout_match(state: AppState, path: Path<KnockoutPath>) -> HttpResponse {
    apply(&state, |t| t.remove_knockout_match(path.id))
}

#[put("/api/knockout/{id}/winner")]
async fn api_record_knockout_winner(
    state: AppState,
    path: Path<KnockoutPath>,
    body: Json<KnockoutWinnerBody>,
) -> HttpResponse {
    apply(&state, |t| t.record_knockout_winner(path.id, body.team_id))
}

#[post("/api/knockout/{id}/propagate")]
async fn api_propagate_winner(
    state: AppState,
    path: Path<KnockoutPath>,
    body: Json<PropagateBody>,
) -> HttpResponse {
    apply(&state, |t| t.propagate_winner(path.id, body.to, body.side))
}

#[post("/api/schedule/start")]
async fn api_start_matchday(state: AppState, body: Json<StartMatchdayBody>) -> HttpResponse {
    apply(&state, |t| {
        t.start_matchday(body.duration_hours, Utc::now()).cloned()
    })
}

#[post("/api/schedule/pause")]
async fn api_pause_matchday(state: AppState) -> HttpResponse {
    apply(&state, |t| Ok::<_, TournamentError>(t.pause_matchday().clone()))
}

#[put("/api/schedule/matchday")]
async fn api_set_matchday(state: AppState, body: Json<SetMatchdayBody>) -> HttpResponse {
    apply(&state, |t| {
        Ok::<_, TournamentError>(t.set_current_matchday(body.matchday).clone())
    })
}

#[post("/api/schedule/advance")]
async fn api_advance_matchday(state: AppState) -> HttpResponse {
    apply(&state, |t| Ok::<_, TournamentError>(t.advance_matchday().clone()))
}

#[put("/api/schedule/auto-process")]
async fn api_set_auto_process(state: AppState, body: Json<AutoProcessBody>) -> HttpResponse {
    apply(&state, |t| {
        Ok::<_, TournamentError>(t.set_auto_process(body.enabled).clone())
    })
}

/// Manual walkover check; `force` skips the deadline.
#[post("/api/walkovers/check")]
async fn api_check_walkovers(state: AppState, body: Option<Json<WalkoverCheckBody>>) -> HttpResponse {
    let force = body.map(|b| b.force).unwrap_or(false);
    commit(&state, |store| {
        Ok::<_, CommitError<TournamentError>>(store.check_and_resolve_timeouts(Utc::now(), force))
    })
}

#[post("/api/seasons/archive")]
async fn api_archive_season(state: AppState, body: Json<ArchiveBody>) -> HttpResponse {
    let body = body.into_inner();
    // Archiving clears the fixtures, which drops their activity in the same commit.
    apply(&state, |t| {
        t.archive_season(
            body.season_name,
            body.champion_id,
            body.runner_up_id,
            body.retain_roster,
            Utc::now(),
        )
    })
}

#[get("/api/seasons")]
async fn api_list_seasons(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(&g.store.state().history),
        Err(_) => HttpResponse::InternalServerError().body("lock error"),
    }
}

/// Periodic walkover check; only acts when auto-processing is enabled.
fn run_scheduled_walkover_check(state: &AppState) {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    let ServerState { store, data_dir } = &mut *g;
    if !store.state().schedule.auto_process_enabled() {
        return;
    }
    let checked = store.commit_to_dir(data_dir, |s| {
        Ok::<_, StoreError>(s.check_and_resolve_timeouts(Utc::now(), false))
    });
    match checked {
        Ok(report) if report.processed_count > 0 => log::info!("{}", report.summary),
        Ok(_) => {}
        Err(e) => log::error!("Failed to save tournament after walkovers: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let store = match TournamentStore::load_from_dir(&config.data_dir) {
        Ok(Some(store)) => {
            log::info!("Loaded tournament from {}", config.data_dir.display());
            store
        }
        Ok(None) => {
            log::info!("No saved tournament in {}; starting fresh", config.data_dir.display());
            TournamentStore::new(Tournament::new(config.tournament_name.clone(), config.tournament_mode))
        }
        Err(e) => {
            log::error!("Could not load tournament: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
        }
    };

    let state = Data::new(RwLock::new(ServerState {
        store,
        data_dir: config.data_dir.clone(),
    }));

    // Background task: walkover check on a fixed cadence
    let state_check = state.clone();
    let interval_len = config.walkover_check_interval;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(interval_len);
        loop {
            interval.tick().await;
            run_scheduled_walkover_check(&state_check);
        }
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_tournament)
            .service(api_add_team)
            .service(api_import_teams)
            .service(api_remove_team)
            .service(api_draw_groups)
            .service(api_assign_group)
            .service(api_generate_fixtures)
            .service(api_update_match_teams)
            .service(api_record_match_result)
            .service(api_record_activity)
            .service(api_add_knockout_match)
            .service(api_update_knockout_match)
            .service(api_remove_knockout_match)
            .service(api_record_knockout_winner)
            .service(api_propagate_winner)
            .service(api_start_matchday)
            .service(api_pause_matchday)
            .service(api_set_matchday)
            .service(api_advance_matchday)
            .service(api_set_auto_process)
            .service(api_check_walkovers)
            .service(api_archive_season)
            .service(api_list_seasons)
    })
    .bind(bind)?
    .run()
    .await
}
