//! Single binary web server: JSON API for the tournament structure engine,
//! landing page from templates/, static from /static.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tournament_stage_web::{
    assign_teams, calculate_standings, clear_matches, complete_round, create_group,
    create_placeholder, create_round, delete_group, delete_round, generate_matches,
    recalculate_group_standings, remove_team, report_match_result, start_round, update_group,
    update_match_status, update_round, AdvancementRule, EngineError, ErrorKind, GenerationFormat,
    GroupFormat, MatchStatus, RoundFormat, RoundType, ScheduleParams, SlotSource, TeamId,
    TieBreak, Tournament, TournamentId,
};
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Map an engine error to a response: the taxonomy decides the status, the
/// Display message goes in the body.
fn engine_error_response(e: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Conflict | ErrorKind::State => HttpResponse::Conflict().json(body),
        ErrorKind::Precondition => HttpResponse::UnprocessableEntity().json(body),
    }
}

/// Run `f` against one tournament under the write lock, refreshing its
/// last-activity stamp. 404 if the id is unknown.
fn with_tournament<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.tournament)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Ok: the whole updated aggregate; Err: the mapped error response.
fn updated<T>(tournament: &Tournament, result: Result<T, EngineError>) -> HttpResponse {
    match result {
        Ok(_) => HttpResponse::Ok().json(tournament),
        Err(e) => engine_error_response(&e),
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    /// Optional custom standings sort chain (e.g. to enable head-to-head).
    tie_breaks: Option<Vec<TieBreak>>,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    name: String,
}

#[derive(Deserialize)]
struct CreateRoundBody {
    name: String,
    round_type: RoundType,
    format: Option<RoundFormat>,
    advancement_rule: Option<AdvancementRule>,
}

#[derive(Deserialize)]
struct UpdateRoundBody {
    name: Option<String>,
    format: Option<RoundFormat>,
    advancement_rule: Option<AdvancementRule>,
}

#[derive(Deserialize)]
struct CompleteRoundBody {
    #[serde(default = "default_recalculate")]
    recalculate_standings: bool,
    #[serde(default)]
    auto_advance_teams: bool,
    selected_team_ids: Option<Vec<TeamId>>,
}

fn default_recalculate() -> bool {
    true
}

#[derive(Deserialize)]
struct CreateGroupBody {
    name: String,
    #[serde(default)]
    format: GroupFormat,
    max_teams: u32,
    advancement_rule: Option<AdvancementRule>,
}

#[derive(Deserialize)]
struct UpdateGroupBody {
    name: Option<String>,
    format: Option<GroupFormat>,
    max_teams: Option<u32>,
    advancement_rule: Option<AdvancementRule>,
}

#[derive(Deserialize)]
struct AssignTeamsBody {
    team_ids: Vec<TeamId>,
}

#[derive(Deserialize)]
struct CreatePlaceholderBody {
    placeholder_name: String,
    source: SlotSource,
}

#[derive(Deserialize)]
struct GenerateMatchesBody {
    format: GenerationFormat,
    start_at: DateTime<Utc>,
    match_duration_minutes: u32,
    match_gap_minutes: u32,
    #[serde(default)]
    double_round_robin: bool,
    venue: Option<String>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    home_score: u32,
    away_score: u32,
}

#[derive(Deserialize)]
struct SetMatchStatusBody {
    status: MatchStatus,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct TournamentRoundPath {
    id: TournamentId,
    round_id: Uuid,
}

#[derive(Deserialize)]
struct TournamentGroupPath {
    id: TournamentId,
    group_id: Uuid,
}

/// Target = a group id or a direct-knockout round id.
#[derive(Deserialize)]
struct TournamentTargetPath {
    id: TournamentId,
    target_id: Uuid,
}

#[derive(Deserialize)]
struct TournamentTargetMemberPath {
    id: TournamentId,
    target_id: Uuid,
    member_id: Uuid,
}

#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-stage-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let mut tournament = Tournament::new(body.name.trim());
    if tournament.name.is_empty() {
        return engine_error_response(&EngineError::EmptyName);
    }
    if let Some(chain) = &body.tie_breaks {
        if !chain.is_empty() {
            tournament.tie_breaks = chain.clone();
        }
    }
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    log::info!("Created tournament {}", id);
    HttpResponse::Ok().json(&g[&id].tournament)
}

/// Get the full tournament structure by id (404 if not found).
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| HttpResponse::Ok().json(t))
}

/// Register one team on the roster.
#[post("/api/tournaments/{id}/teams")]
async fn api_register_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = t.register_team(body.name.trim());
        updated(t, result)
    })
}

/// Import a CSV of team names (one per record, optional `name` header).
/// All-or-nothing: any bad record rejects the whole file.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(
    state: AppState,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());
        let mut names: Vec<String> = Vec::new();
        for record in reader.records() {
            match record {
                Ok(record) => {
                    if let Some(field) = record.get(0) {
                        if !field.is_empty() {
                            names.push(field.to_string());
                        }
                    }
                }
                Err(e) => {
                    return HttpResponse::BadRequest()
                        .json(serde_json::json!({ "error": format!("CSV parse error: {}", e) }))
                }
            }
        }
        if names.first().map(|n| n.eq_ignore_ascii_case("name")) == Some(true) {
            names.remove(0);
        }
        match t.register_teams(&names) {
            Ok(ids) => {
                log::info!("Imported {} team(s) into tournament {}", ids.len(), t.id);
                HttpResponse::Ok()
                    .json(serde_json::json!({ "imported": ids.len(), "team_ids": ids }))
            }
            Err(e) => engine_error_response(&e),
        }
    })
}

/// Drop a roster entry (refused while the team occupies a slot).
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_roster_team(
    state: AppState,
    path: Path<TournamentTeamPath>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = t.remove_team_entry(path.team_id);
        updated(t, result)
    })
}

/// Create a round at the end of the sequence.
#[post("/api/tournaments/{id}/rounds")]
async fn api_create_round(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CreateRoundBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = create_round(
            t,
            &body.name,
            body.round_type,
            body.format,
            body.advancement_rule.clone(),
        );
        updated(t, result)
    })
}

/// Update a round's name, advisory format, or advancement rule.
#[put("/api/tournaments/{id}/rounds/{round_id}")]
async fn api_update_round(
    state: AppState,
    path: Path<TournamentRoundPath>,
    body: Json<UpdateRoundBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = update_round(
            t,
            path.round_id,
            body.name.as_deref(),
            body.format,
            body.advancement_rule.clone(),
        );
        updated(t, result)
    })
}

/// Delete a round and everything under it. No undo.
#[delete("/api/tournaments/{id}/rounds/{round_id}")]
async fn api_delete_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = delete_round(t, path.round_id);
        updated(t, result)
    })
}

/// Start a round (first round, or predecessor completed).
#[post("/api/tournaments/{id}/rounds/{round_id}/start")]
async fn api_start_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = start_round(t, path.round_id);
        updated(t, result)
    })
}

/// Complete an ongoing round; optionally recompute standings and advance
/// teams into the next round (rule-driven, or the explicit selection).
#[post("/api/tournaments/{id}/rounds/{round_id}/complete")]
async fn api_complete_round(
    state: AppState,
    path: Path<TournamentRoundPath>,
    body: Json<CompleteRoundBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        match complete_round(
            t,
            path.round_id,
            body.recalculate_standings,
            body.auto_advance_teams,
            body.selected_team_ids.as_deref(),
        ) {
            Ok(report) => HttpResponse::Ok()
                .json(serde_json::json!({ "tournament": t, "advancement": report })),
            Err(e) => engine_error_response(&e),
        }
    })
}

/// Create a group under a group-based round.
#[post("/api/tournaments/{id}/rounds/{round_id}/groups")]
async fn api_create_group(
    state: AppState,
    path: Path<TournamentRoundPath>,
    body: Json<CreateGroupBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = create_group(
            t,
            path.round_id,
            &body.name,
            body.format,
            body.max_teams,
            body.advancement_rule.clone(),
        );
        updated(t, result)
    })
}

/// Update a group's name, format, capacity, or rule override.
#[put("/api/tournaments/{id}/groups/{group_id}")]
async fn api_update_group(
    state: AppState,
    path: Path<TournamentGroupPath>,
    body: Json<UpdateGroupBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = update_group(
            t,
            path.group_id,
            body.name.as_deref(),
            body.format,
            body.max_teams,
            body.advancement_rule.clone(),
        );
        updated(t, result)
    })
}

/// Delete a group with its matches and standings.
#[delete("/api/tournaments/{id}/groups/{group_id}")]
async fn api_delete_group(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = delete_group(t, path.group_id);
        updated(t, result)
    })
}

/// Assign teams to a group or knockout round (target id selects which).
#[post("/api/tournaments/{id}/targets/{target_id}/teams")]
async fn api_assign_teams(
    state: AppState,
    path: Path<TournamentTargetPath>,
    body: Json<AssignTeamsBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = assign_teams(t, path.target_id, &body.team_ids);
        updated(t, result)
    })
}

/// Remove a seated team (by team id, or a slot id for placeholders).
#[delete("/api/tournaments/{id}/targets/{target_id}/teams/{member_id}")]
async fn api_remove_assigned_team(
    state: AppState,
    path: Path<TournamentTargetMemberPath>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = remove_team(t, path.target_id, path.member_id);
        updated(t, result)
    })
}

/// Create a placeholder slot fed by a match outcome or group placement.
#[post("/api/tournaments/{id}/targets/{target_id}/placeholders")]
async fn api_create_placeholder(
    state: AppState,
    path: Path<TournamentTargetPath>,
    body: Json<CreatePlaceholderBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = create_placeholder(
            t,
            path.target_id,
            &body.placeholder_name,
            body.source.clone(),
        );
        updated(t, result)
    })
}

/// Generate the full match schedule for a group or knockout round.
#[post("/api/tournaments/{id}/targets/{target_id}/matches/generate")]
async fn api_generate_matches(
    state: AppState,
    path: Path<TournamentTargetPath>,
    body: Json<GenerateMatchesBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let params = ScheduleParams {
            start_at: body.start_at,
            match_duration_minutes: body.match_duration_minutes,
            match_gap_minutes: body.match_gap_minutes,
            venue: body.venue.clone(),
        };
        let result = generate_matches(
            t,
            path.target_id,
            body.format,
            body.double_round_robin,
            &params,
        );
        updated(t, result)
    })
}

/// Remove every match of a group (bulk, no partial clearing).
#[delete("/api/tournaments/{id}/groups/{group_id}/matches")]
async fn api_clear_matches(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = clear_matches(t, path.group_id);
        updated(t, result)
    })
}

/// Report a final score (external result source writes through here).
#[post("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = report_match_result(t, path.match_id, body.home_score, body.away_score);
        updated(t, result)
    })
}

/// Move a match between its non-final states.
#[put("/api/tournaments/{id}/matches/{match_id}/status")]
async fn api_set_match_status(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<SetMatchStatusBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = update_match_status(t, path.match_id, body.status);
        updated(t, result)
    })
}

/// Refresh one group's standings snapshot from its matches.
#[post("/api/tournaments/{id}/groups/{group_id}/standings/recalculate")]
async fn api_recalculate_standings(
    state: AppState,
    path: Path<TournamentGroupPath>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let result = recalculate_group_standings(t, path.group_id);
        updated(t, result)
    })
}

/// Get one round.
#[get("/api/tournaments/{id}/rounds/{round_id}")]
async fn api_get_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| match t.round(path.round_id) {
        Some(round) => HttpResponse::Ok().json(round),
        None => engine_error_response(&EngineError::RoundNotFound(path.round_id)),
    })
}

/// Get one group.
#[get("/api/tournaments/{id}/groups/{group_id}")]
async fn api_get_group(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| match t.group(path.group_id) {
        Some(group) => HttpResponse::Ok().json(group),
        None => engine_error_response(&EngineError::GroupNotFound(path.group_id)),
    })
}

/// Get a group's standings, computed fresh from its completed matches.
#[get("/api/tournaments/{id}/groups/{group_id}/standings")]
async fn api_get_group_standings(
    state: AppState,
    path: Path<TournamentGroupPath>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| match t.group(path.group_id) {
        Some(group) => {
            let table = calculate_standings(&t.teams, &group.slots, &group.matches, &t.tie_breaks);
            HttpResponse::Ok().json(table)
        }
        None => engine_error_response(&EngineError::GroupNotFound(path.group_id)),
    })
}

/// Get a group's matches in schedule order.
#[get("/api/tournaments/{id}/groups/{group_id}/matches")]
async fn api_get_group_matches(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| match t.group(path.group_id) {
        Some(group) => HttpResponse::Ok().json(&group.matches),
        None => engine_error_response(&EngineError::GroupNotFound(path.group_id)),
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive tournament(s) (no activity for 12h)",
                    removed
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_register_team)
            .service(api_import_teams)
            .service(api_remove_roster_team)
            .service(api_create_round)
            .service(api_update_round)
            .service(api_delete_round)
            .service(api_start_round)
            .service(api_complete_round)
            .service(api_create_group)
            .service(api_update_group)
            .service(api_delete_group)
            .service(api_assign_teams)
            .service(api_remove_assigned_team)
            .service(api_create_placeholder)
            .service(api_generate_matches)
            .service(api_clear_matches)
            .service(api_report_result)
            .service(api_set_match_status)
            .service(api_recalculate_standings)
            .service(api_get_round)
            .service(api_get_group)
            .service(api_get_group_standings)
            .service(api_get_group_matches)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
