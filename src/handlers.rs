use std::sync::Arc;

use anagram_core::{ProcessorOptions, classify_partitions};
use anagram_corpus::MemoryResources;
use anagram_types::OutputRecord;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Locator the request's inline skip list is registered under.
const REQUEST_SKIP_LOCATOR: &str = "request-skip";

/// Body allowance on top of `max_text_bytes` for the JSON envelope, escapes
/// and the inline skip list.
const BODY_HEADROOM: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub max_text_bytes: usize,
}

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    /// Comma-separated skip words, same format as a skip file.
    pub skip: Option<String>,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    records: Vec<OutputRecord>,
    pairs: u64,
    keys: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_text_bytes.saturating_add(BODY_HEADROOM);
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/classify", post(classify))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(Arc::new(state))
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    if request.text.len() > state.max_text_bytes {
        return Err(ApiError::bad_request(format!(
            "text must be at most {} bytes",
            state.max_text_bytes
        )));
    }

    let mut resources = MemoryResources::new();
    let mut options = ProcessorOptions::default();
    if let Some(skip) = request.skip {
        resources.insert(REQUEST_SKIP_LOCATOR, skip);
        options.skip_patterns = true;
        options.skip_locator = Some(REQUEST_SKIP_LOCATOR.to_string());
    }

    let text = request.text;
    let result = tokio::task::spawn_blocking(move || {
        classify_partitions([text], &options, &resources)
    })
    .await
    .map_err(|err| {
        error!("classification task failed: {err}");
        ApiError::Internal
    })?;

    Ok(Json(ClassifyResponse {
        records: result.records,
        pairs: result.stats.pairs,
        keys: result.keys,
    }))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
