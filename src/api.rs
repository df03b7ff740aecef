//! HTTP surface of the purchases service.
//!
//! ## Routes
//!
//! - `GET /` welcome text
//! - `GET /health` liveness plus current record count
//! - `GET /metrics` Prometheus exposition, 404 when metrics are disabled
//! - `GET|POST /api/purchases`
//! - `GET|PUT|DELETE /api/purchases/:id`
//!
//! The purchase routes also match with a trailing slash. Errors are answered
//! as plain text: 400 for validation failures, 404 for unknown ids. A known
//! path with an unsupported method gets axum's 405.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::Purchase;
use crate::storage::{PurchaseStore, StorageError};
use crate::telemetry;
use crate::validation::{validate_purchase, ValidationError};

pub const WELCOME_MESSAGE: &str = "Welcome to the purchases API";
pub const NOT_FOUND_MESSAGE: &str = "The requested purchase was not found";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PurchaseStore>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Arc<dyn PurchaseStore>, metrics: Option<PrometheusHandle>) -> Self {
        Self { store, metrics }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no purchase matches id parameter {0:?}")]
    InvalidId(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(StorageError::NotFound(_)) | ApiError::InvalidId(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(StorageError::Poisoned) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = match &self {
            ApiError::Storage(StorageError::NotFound(_)) | ApiError::InvalidId(_) => {
                NOT_FOUND_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

/// Build the axum `Router` serving the purchases API over the given state.
pub fn router(state: AppState) -> Router {
    let collection = get(list_purchases).post(create_purchase);
    let item = get(get_purchase).put(update_purchase).delete(delete_purchase);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .route("/api/purchases", collection.clone())
        .route("/api/purchases/", collection)
        .route("/api/purchases/:id", item.clone())
        .route("/api/purchases/:id/", item)
        .layer(middleware::from_fn(telemetry::track_requests))
        .with_state(state)
}

/// Reads an id the way a lenient integer parser would: optional leading
/// whitespace and sign, then the longest run of digits. Anything after the
/// digits is ignored. Returns `None` when no positive id can be read.
pub fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: u64 = rest[..digits_end].parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

fn path_id(raw: String) -> Result<u64, ApiError> {
    parse_id(&raw).ok_or(ApiError::InvalidId(raw))
}

/// An empty body counts as an empty object, so it fails on the first
/// required field rather than on JSON syntax.
fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationError::new(format!("request body is not valid JSON: {}", e)))
}

fn record_store_size(state: &AppState) -> Result<(), ApiError> {
    telemetry::record_store_size(state.store.len()?);
    Ok(())
}

async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.store.len()?;
    Ok(Json(json!({ "status": "ok", "purchases": count })))
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_purchases(State(state): State<AppState>) -> Result<Json<Vec<Purchase>>, ApiError> {
    Ok(Json(state.store.list()?))
}

async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Purchase>, ApiError> {
    let id = path_id(id)?;
    Ok(Json(state.store.get(id)?))
}

async fn create_purchase(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Purchase>), ApiError> {
    let input = validate_purchase(&parse_body(&body)?)?;
    let purchase = state.store.create(input)?;
    tracing::info!(id = purchase.id, name = %purchase.name, "Purchase created");
    record_store_size(&state)?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

async fn update_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Purchase>, ApiError> {
    let id = path_id(id)?;
    // Unknown ids win over bad bodies.
    state.store.get(id)?;
    let input = validate_purchase(&parse_body(&body)?)?;
    let purchase = state.store.update(id, input)?;
    tracing::info!(id, "Purchase updated");
    Ok(Json(purchase))
}

async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Purchase>, ApiError> {
    let id = path_id(id)?;
    let purchase = state.store.delete(id)?;
    tracing::info!(id, "Purchase deleted");
    record_store_size(&state)?;
    Ok(Json(purchase))
}
