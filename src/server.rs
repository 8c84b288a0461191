//! JSON HTTP API for the codex engine.
//!
//! Exposes the engine to browser-based viewers and scripts. Datasets
//! are merged lazily on first touch, so the first request for a key
//! pays the chunk fetch cost and later requests hit the cache.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check (returns version) |
//! | `GET` | `/datasets` | List datasets with index metadata |
//! | `GET` | `/datasets/{key}/search?q=&limit=` | Query one dataset |
//! | `GET` | `/datasets/{key}/records/{id}?hidden=` | Structured record view |
//! | `GET` | `/datasets/{key}/inspect` | Dataset analytics report |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "dataset not found: weapons_x" } }
//! ```
//!
//! Codes: `not_found` (404), `bad_request` (400), `config_error` /
//! `chunk_fetch_error` / `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a static-hosted
//! viewer on another origin can call the API directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::codex::Codex;
use crate::config::Config;
use crate::error::CodexError;
use crate::models::ResultEntry;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    codex: Arc<Codex>,
    max_results: usize,
}

/// Start the HTTP server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config, codex: Arc<Codex>) -> anyhow::Result<()> {
    let state = AppState {
        codex,
        max_results: config.search.max_results,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/datasets", get(handle_datasets))
        .route("/datasets/{key}/search", get(handle_search))
        .route("/datasets/{key}/records/{id}", get(handle_record))
        .route("/datasets/{key}/inspect", get(handle_inspect))
        .layer(cors)
        .with_state(state);

    info!(bind = %config.server.bind, "codex server listening");
    println!("codex server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error body: `{ "error": { "code", "message" } }`.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CodexError> for AppError {
    fn from(err: CodexError) -> Self {
        let status = match &err {
            CodexError::DatasetNotFound(_) | CodexError::RecordNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            CodexError::Config(_) | CodexError::ChunkFetch { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /datasets ============

#[derive(Serialize)]
struct DatasetListResponse {
    datasets: Vec<DatasetEntry>,
}

#[derive(Serialize)]
struct DatasetEntry {
    key: String,
    records_total: Option<u64>,
    chunks: usize,
    source_kind: Option<String>,
}

async fn handle_datasets(State(state): State<AppState>) -> Json<DatasetListResponse> {
    let index = state.codex.index();
    let datasets = state
        .codex
        .dataset_keys()
        .into_iter()
        .map(|key| {
            let meta = &index.datasets[&key];
            DatasetEntry {
                records_total: meta.records_total,
                chunks: meta.chunks.len(),
                source_kind: meta.source_kind.clone(),
                key,
            }
        })
        .collect();
    Json(DatasetListResponse { datasets })
}

// ============ GET /datasets/{key}/search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    total: usize,
    shown: usize,
    results: Vec<ResultEntry>,
}

async fn handle_search(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let mut results = state.codex.search(&key, &params.q).await?;
    let total = results.len();
    results.truncate(params.limit.unwrap_or(state.max_results));
    Ok(Json(SearchResponse {
        total,
        shown: results.len(),
        results,
    }))
}

// ============ GET /datasets/{key}/records/{id} ============

#[derive(Deserialize)]
struct RecordParams {
    #[serde(default)]
    hidden: bool,
}

async fn handle_record(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
    Query(params): Query<RecordParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = state.codex.record_view(&key, &id, params.hidden).await?;
    Ok(Json(serde_json::to_value(&view).unwrap_or_default()))
}

// ============ GET /datasets/{key}/inspect ============

async fn handle_inspect(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = state.codex.inspect_dataset(&key).await?;
    Ok(Json(serde_json::to_value(&*report).unwrap_or_default()))
}
