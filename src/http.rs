//! HTTP transport for the player store.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` — `{ "ok": true, "players": <count> }`.
//! - `GET /api/players` — the whole collection.
//! - `POST /api/players` — create a player from a `NewPlayer` body.
//! - `PUT /api/players` — replace the whole collection.
//! - `GET | PATCH | DELETE /api/players/:id` — single-player access.
//! - `PUT /api/players/:id/stats/:mode` — set one mode's stat.
//! - `GET /api/leaderboard?q=&mode=&limit=` — the filtered listing.
//! - `GET /api/leaderboard/top?n=` — top players by overall points.
//! - `GET /api/modes/:mode` — players rated in a mode.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tier_list::{http, InMemoryCollection, PlayerStore};
//!
//! let store = Arc::new(PlayerStore::open(InMemoryCollection::new())?);
//!
//! // Get the router to compose with other axum routes
//! let app = http::router(store.clone());
//!
//! // Or serve directly
//! http::serve(store, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::StoreError;
use crate::player::{GameMode, ModeStat, NewPlayer, PlayerPatch, PlayerRecord};
use crate::port::CollectionPort;
use crate::query::LeaderboardFilter;
use crate::store::PlayerStore;

type SharedStore<P> = Arc<PlayerStore<P>>;

/// Error returned by route handlers, rendered as `{ "error": "..." }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Store(StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::IdsExhausted) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => format!("bad request: {}", msg),
            ApiError::NotFound(id) => format!("player not found: {}", id),
            ApiError::Store(e) => e.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.message());
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Build an axum `Router` over the given store.
pub fn router<P: CollectionPort + 'static>(store: SharedStore<P>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<P>))
        .route(
            "/api/players",
            get(list_handler::<P>)
                .post(create_handler::<P>)
                .put(replace_handler::<P>),
        )
        .route(
            "/api/players/:id",
            get(get_handler::<P>)
                .patch(update_handler::<P>)
                .delete(delete_handler::<P>),
        )
        .route("/api/players/:id/stats/:mode", put(rate_handler::<P>))
        .route("/api/leaderboard", get(leaderboard_handler::<P>))
        .route("/api/leaderboard/top", get(top_handler::<P>))
        .route("/api/modes/:mode", get(mode_handler::<P>))
        .with_state(store)
}

/// Serve the store over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<P: CollectionPort + 'static>(
    store: SharedStore<P>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down");
    }
}

fn parse_mode(label: &str) -> ApiResult<GameMode> {
    label
        .parse()
        .map_err(|e: crate::player::UnknownLabel| ApiError::BadRequest(e.to_string()))
}

/// `GET /health`
async fn health_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
) -> ApiResult<impl IntoResponse> {
    let players = store.len()?;
    Ok(Json(json!({ "ok": true, "players": players })))
}

/// `GET /api/players`
async fn list_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
) -> ApiResult<Json<Vec<PlayerRecord>>> {
    Ok(Json(store.list_all()?))
}

/// `POST /api/players`
async fn create_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    body: Result<Json<NewPlayer>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(player) = body?;
    let record = store.create(player)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /api/players`
async fn replace_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    body: Result<Json<Vec<PlayerRecord>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(players) = body?;
    let count = players.len();
    store.replace_all(players)?;
    Ok(Json(json!({ "ok": true, "count": count })))
}

/// `GET /api/players/:id`
async fn get_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlayerRecord>> {
    store
        .get_by_id(&id)?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// `PATCH /api/players/:id`
async fn update_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Path(id): Path<String>,
    body: Result<Json<PlayerPatch>, JsonRejection>,
) -> ApiResult<Json<PlayerRecord>> {
    let Json(patch) = body?;
    store
        .update(&id, patch)?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// `DELETE /api/players/:id`
async fn delete_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !store.delete(&id)? {
        return Err(ApiError::NotFound(id));
    }
    Ok(Json(json!({ "deleted": true })))
}

/// `PUT /api/players/:id/stats/:mode`
async fn rate_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Path((id, mode)): Path<(String, String)>,
    body: Result<Json<ModeStat>, JsonRejection>,
) -> ApiResult<Json<PlayerRecord>> {
    let mode = parse_mode(&mode)?;
    let Json(stat) = body?;
    store
        .rate(&id, mode, stat)?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

#[derive(Debug, Default, Deserialize)]
struct LeaderboardParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

/// `GET /api/leaderboard`
async fn leaderboard_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<impl IntoResponse> {
    let filter = LeaderboardFilter {
        query: params.q,
        mode: params.mode.as_deref().map(parse_mode).transpose()?,
    };

    let mut rows = store.leaderboard()?.rows(&filter);
    if let Some(limit) = params.limit {
        rows.truncate(limit);
    }
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct TopParams {
    #[serde(default = "default_top")]
    n: usize,
}

fn default_top() -> usize {
    10
}

/// `GET /api/leaderboard/top`
async fn top_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Query(params): Query<TopParams>,
) -> ApiResult<Json<Vec<PlayerRecord>>> {
    Ok(Json(store.leaderboard()?.top_n(params.n)))
}

/// `GET /api/modes/:mode`
async fn mode_handler<P: CollectionPort + 'static>(
    State(store): State<SharedStore<P>>,
    Path(mode): Path<String>,
) -> ApiResult<Json<Vec<PlayerRecord>>> {
    let mode = parse_mode(&mode)?;
    Ok(Json(store.leaderboard()?.by_game_mode(mode)))
}
