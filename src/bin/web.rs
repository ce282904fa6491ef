//! Single binary web server: JSON REST API over the tournament organizer.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use swiss_cutoff::{
    MatchId, Organizer, Outcome, PlayerId, Standing, Tournament, TournamentConfig,
    TournamentError, TournamentId, DEFAULT_ELIMINATION_THRESHOLD,
};

/// Per-tournament entry: organizer + pending notices + last activity time (for auto-cleanup).
struct TournamentEntry {
    organizer: Organizer,
    notices: Arc<Mutex<Vec<String>>>,
    last_activity: Instant,
}

impl TournamentEntry {
    fn new(config: TournamentConfig) -> Self {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notices);
        let organizer = Organizer::new(config).on_notice(move |msg| {
            if let Ok(mut pending) = sink.lock() {
                pending.push(msg.to_string());
            }
        });
        Self {
            organizer,
            notices,
            last_activity: Instant::now(),
        }
    }

    /// Current view; hands out (and clears) the notices gathered since the last response.
    fn view(&self) -> TournamentView<'_> {
        let notices = self
            .notices
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default();
        let o = &self.organizer;
        TournamentView {
            tournament: o.tournament(),
            total_rounds: o.total_rounds(),
            round_complete: o.is_round_complete(),
            can_undo: o.can_undo(),
            standings: o.standings(),
            champion: o.champion().map(|p| p.name.as_str()),
            notices,
        }
    }
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TournamentView<'a> {
    tournament: &'a Tournament,
    total_rounds: u32,
    round_complete: bool,
    can_undo: bool,
    standings: Vec<Standing>,
    champion: Option<&'a str>,
    notices: Vec<String>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default = "default_elimination_threshold")]
    elimination_threshold: Option<u32>,
    #[serde(default)]
    snapshot_each_result: bool,
}

fn default_elimination_threshold() -> Option<u32> {
    Some(DEFAULT_ELIMINATION_THRESHOLD)
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct EliminationThresholdBody {
    elimination_threshold: Option<u32>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    outcome: Outcome,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and player id (e.g. /api/tournaments/{id}/players/{player_id})
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

/// Path segments: tournament id and match id (e.g. /api/tournaments/{id}/matches/{match_id}/result)
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

fn error_body(e: &TournamentError) -> serde_json::Value {
    serde_json::json!({ "error": e.to_string() })
}

fn no_tournament() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

/// Look up a tournament, touch it, run `action` and answer with the updated view.
fn with_tournament(
    state: &AppState,
    id: TournamentId,
    action: impl FnOnce(&mut Organizer) -> Result<(), TournamentError>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return no_tournament(),
    };
    entry.last_activity = Instant::now();
    match action(&mut entry.organizer) {
        Ok(()) => HttpResponse::Ok().json(entry.view()),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string(),
            "notices": entry.view().notices,
        })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-cutoff",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Option<Json<CreateTournamentBody>>) -> HttpResponse {
    let config = match body {
        Some(b) => TournamentConfig {
            elimination_threshold: b.elimination_threshold,
            snapshot_each_result: b.snapshot_each_result,
        },
        None => TournamentConfig::default(),
    };
    let entry = TournamentEntry::new(config);
    let id = entry.organizer.tournament().id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(entry.view());
    g.insert(id, entry);
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |_| Ok(()))
}

/// Add a player (Setup, or a late entry while in progress).
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(state: AppState, path: Path<TournamentPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.add_player(&body.name).map(|_| ()))
}

/// Remove a player by id (tournament must be in Setup).
#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.remove_player(path.player_id))
}

/// Drop a player from future rounds (tournament must be in progress).
#[post("/api/tournaments/{id}/players/{player_id}/drop")]
async fn api_drop_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.drop_player(path.player_id))
}

/// Update losses before elimination, null for points-only (tournament must be in Setup).
#[put("/api/tournaments/{id}/elimination-threshold")]
async fn api_set_elimination_threshold(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<EliminationThresholdBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.set_elimination_threshold(body.elimination_threshold))
}

/// Start the tournament (Setup -> InProgress) and pair round 1.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.start().map(|_| ()))
}

/// Record the outcome of one match.
#[put("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.record_result(path.match_id, body.outcome))
}

/// Clear the outcome of one match.
#[delete("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_undo_result(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.undo_result(path.match_id))
}

/// Close the round: pair the next one or finish.
#[post("/api/tournaments/{id}/advance")]
async fn api_advance_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |o| o.advance_round().map(|_| ()))
}

/// Undo the last round generation (or other snapshotted change).
#[post("/api/tournaments/{id}/undo")]
async fn api_undo(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, Organizer::undo)
}

/// Reset a finished tournament back to an empty Setup.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, Organizer::reset)
}

/// Download the tournament as a JSON document.
#[get("/api/tournaments/{id}/export")]
async fn api_export(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return no_tournament(),
    };
    match entry.organizer.save() {
        Ok(doc) => HttpResponse::Ok().content_type("application/json").body(doc),
        Err(e) => HttpResponse::InternalServerError().json(error_body(&e)),
    }
}

/// Standings as CSV.
#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return no_tournament(),
    };
    match entry.organizer.standings_csv() {
        Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
        Err(e) => HttpResponse::InternalServerError().json(error_body(&e)),
    }
}

/// Upload a previously exported document; it is stored under its own tournament id.
#[post("/api/tournaments/import")]
async fn api_import(state: AppState, body: String) -> HttpResponse {
    let mut entry = TournamentEntry::new(TournamentConfig::default());
    if let Err(e) = entry.organizer.load(&body) {
        return HttpResponse::BadRequest().json(error_body(&e));
    }
    let id = entry.organizer.tournament().id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(entry.view());
    g.insert(id, entry);
    response
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
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_import)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_drop_player)
            .service(api_set_elimination_threshold)
            .service(api_start_tournament)
            .service(api_record_result)
            .service(api_undo_result)
            .service(api_advance_round)
            .service(api_undo)
            .service(api_reset)
            .service(api_export)
            .service(api_standings_csv)
    })
    .bind(bind)?
    .run()
    .await
}
