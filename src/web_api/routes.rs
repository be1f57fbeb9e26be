//! API Routes

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::capture_flow::Side;
use crate::error::Error;
use crate::models::ApiResponse;
use crate::moderation::{StatusFilter, StatusUpdateRequest};
use crate::state::AppState;

/// Multipart limit above the 5 MB image cap so oversized uploads reach
/// service validation and get a clean error instead of a connection drop
const MULTIPART_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Verification records (reviewer side)
        .route("/api/verifications", get(list_verifications))
        .route("/api/verifications/:id", get(get_verification))
        .route("/api/verifications/:id/status", put(update_status))
        .route(
            "/api/verifications/:id/photos/:side",
            post(replace_photo).layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT)),
        )
        // Capture station (kiosk side)
        .route("/api/capture", get(capture_state))
        .route("/api/capture/start", post(capture_start))
        .route("/api/capture/shot", post(capture_shot))
        .route("/api/capture/reset", post(capture_reset))
        .route("/api/capture/submit", post(capture_submit))
        .with_state(state)
}

// ========================================
// Verification Handlers
// ========================================

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: Option<StatusFilter>,
    #[serde(default)]
    search: Option<String>,
}

async fn list_verifications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let filter = query.status.unwrap_or_default();
    let search = query.search.unwrap_or_default();

    match state.moderation.list(filter, &search).await {
        Ok(records) => Json(ApiResponse::success(records)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.moderation.review(&id).await {
        Ok(detail) => Json(ApiResponse::success(detail)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> impl IntoResponse {
    match state.moderation.set_status(&id, req.status, req.notes).await {
        Ok(record) => Json(ApiResponse::success(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn replace_photo(
    State(state): State<AppState>,
    Path((id, side)): Path<(String, String)>,
    multipart: Multipart,
) -> impl IntoResponse {
    let side = match Side::parse(&side) {
        Ok(side) => side,
        Err(e) => return e.into_response(),
    };

    let (bytes, content_type) = match read_file_part(multipart).await {
        Ok(part) => part,
        Err(e) => return e.into_response(),
    };

    match state
        .moderation
        .replace_image(&id, side, bytes, &content_type)
        .await
    {
        Ok(url) => Json(ApiResponse::success(url)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// First file field of the multipart body
async fn read_file_part(mut multipart: Multipart) -> crate::error::Result<(Vec<u8>, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("malformed multipart body: {}", e)))?
    {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("file part read failed: {}", e)))?;
        return Ok((bytes.to_vec(), content_type));
    }
    Err(Error::Validation("no file part in request".to_string()))
}

// ========================================
// Capture Handlers
// ========================================

async fn capture_state(State(state): State<AppState>) -> impl IntoResponse {
    let capture = state.capture.lock().await;
    Json(ApiResponse::success(capture.state()))
}

async fn capture_start(State(state): State<AppState>) -> impl IntoResponse {
    let mut capture = state.capture.lock().await;
    match capture.start().await {
        Ok(capture_state) => Json(ApiResponse::success(capture_state)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn capture_shot(State(state): State<AppState>) -> impl IntoResponse {
    let mut capture = state.capture.lock().await;
    match capture.capture_shot().await {
        Ok(capture_state) => Json(ApiResponse::success(capture_state)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn capture_reset(State(state): State<AppState>) -> impl IntoResponse {
    let mut capture = state.capture.lock().await;
    match capture.discard_and_restart().await {
        Ok(capture_state) => Json(ApiResponse::success(capture_state)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn capture_submit(State(state): State<AppState>) -> impl IntoResponse {
    let mut capture = state.capture.lock().await;
    match capture.submit().await {
        Ok(record) => (StatusCode::CREATED, Json(ApiResponse::success(record))).into_response(),
        Err(e) => e.into_response(),
    }
}
