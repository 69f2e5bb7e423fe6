//! Read-only REST API handlers and embedded static assets.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use trackboard_core::models::RegisteredModel;
use trackboard_core::preview::{classify, PreviewKind};
use trackboard_core::tabular::{runs_table, Table};
use trackboard_core::views::{metric_keys, metric_series};
use trackboard_core::walker::walk_artifacts;
use trackboard_core::{DashError, Experiment};

use crate::state::AppState;

// ─── Router ──────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/experiments", get(list_experiments))
        .route("/experiments/{id}/runs", get(list_runs))
        .route("/experiments/{id}/metrics", get(list_metric_keys))
        .route("/experiments/{id}/metrics/{key}", get(get_metric_series))
        .route("/models", get(list_models))
        .route("/runs/{run}/artifacts", get(list_artifacts))
        .route("/runs/{run}/artifacts/raw", get(get_artifact_raw))
        .route("/config", get(get_server_config))
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failed API call, answered with a status code and the error text.
#[derive(Debug)]
pub enum ApiError {
    Dash(DashError),
    Join(String),
}

impl From<DashError> for ApiError {
    fn from(err: DashError) -> Self {
        ApiError::Dash(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Dash(DashError::TrackingServiceUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Dash(DashError::MaxDepthExceeded { .. })
            | ApiError::Dash(DashError::PreviewParse { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            ApiError::Dash(err) => err.to_string(),
            ApiError::Join(msg) => msg,
        };
        (status, message).into_response()
    }
}

/// Runs a blocking tracking-service query off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> trackboard_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Join(e.to_string()))?
        .map_err(ApiError::from)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn list_experiments(State(state): State<AppState>) -> Result<Json<Vec<Experiment>>, ApiError> {
    let ctx = state.ctx.clone();
    let experiments = blocking(move || ctx.service.list_experiments()).await?;
    Ok(Json(experiments))
}

async fn list_runs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Table>, ApiError> {
    let ctx = state.ctx.clone();
    let runs = blocking(move || ctx.service.list_runs(&id)).await?;
    Ok(Json(runs_table(&runs)))
}

async fn list_metric_keys(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let ctx = state.ctx.clone();
    let runs = blocking(move || ctx.service.list_runs(&id)).await?;
    Ok(Json(metric_keys(&runs)))
}

async fn get_metric_series(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = state.ctx.clone();
    let runs = blocking(move || ctx.service.list_runs(&id)).await?;
    let points: Vec<_> = metric_series(&runs, &key)
        .into_iter()
        .map(|(run_id, value)| json!({"run_id": run_id, "value": value}))
        .collect();
    Ok(Json(points))
}

async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<RegisteredModel>>, ApiError> {
    let ctx = state.ctx.clone();
    let models = blocking(move || ctx.service.list_registered_models()).await?;
    Ok(Json(models))
}

#[derive(Serialize)]
struct ArtifactEntry {
    path: String,
    kind: PreviewKind,
}

async fn list_artifacts(
    State(state): State<AppState>,
    Path(run): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = state.ctx.clone();
    let files = blocking(move || {
        walk_artifacts(ctx.service.as_ref(), &run, "", ctx.max_artifact_depth)
    })
    .await?;
    let entries: Vec<ArtifactEntry> = files
        .into_iter()
        .map(|path| ArtifactEntry {
            kind: classify(&path),
            path,
        })
        .collect();
    Ok(Json(entries))
}

#[derive(Deserialize)]
struct ArtifactQuery {
    path: String,
}

async fn get_artifact_raw(
    State(state): State<AppState>,
    Path(run): Path<String>,
    Query(q): Query<ArtifactQuery>,
) -> Result<Response, ApiError> {
    let ctx = state.ctx.clone();
    let path = q.path.clone();
    let bytes = blocking(move || ctx.service.fetch_artifact(&run, &path)?.read_bytes()).await?;

    let mime = mime_guess::from_path(&q.path).first_or_octet_stream();
    Ok(Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

async fn get_server_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "tracking_uri": state.tracking_uri,
        "max_artifact_depth": state.ctx.max_artifact_depth,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ─── Assets (embedded) ───────────────────────────────────────────────────────

/// Serve embedded stylesheets under `/assets/`.
pub async fn serve_assets(uri: axum::http::Uri) -> impl IntoResponse {
    let Some(path) = uri.path().strip_prefix("/assets/") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(content) = Assets::get(path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content.data.into_owned()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[derive(rust_embed::Embed)]
#[folder = "assets/"]
#[include = "*.css"]
struct Assets;
