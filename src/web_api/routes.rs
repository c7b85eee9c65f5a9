//! API Routes

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

use crate::error::Error;
use crate::models::{CreateStreamRequest, SystemStatsResponse};
use crate::state::AppState;
use crate::stream_registry::{AddOutcome, StreamRecord};

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & metadata
        .route("/health", get(super::health_check))
        .route("/api/server-info", get(super::server_info))
        // Streams
        .route("/api/streams", get(list_streams))
        .route("/api/streams", post(create_stream))
        .route("/api/streams/:id", delete(delete_stream))
        .route("/api/streams/:id/restart", post(restart_stream))
        // Telemetry
        .route("/api/system-stats", get(system_stats))
        .with_state(state)
}

// ========================================
// Stream Handlers
// ========================================

async fn list_streams(State(state): State<AppState>) -> impl IntoResponse {
    let streams = state.registry.list().await;
    Json(streams)
}

fn stream_body(record: &StreamRecord) -> serde_json::Value {
    json!({
        "id": record.id,
        "rtspUrl": record.source_url,
        "status": record.status,
    })
}

async fn create_stream(
    State(state): State<AppState>,
    Json(req): Json<CreateStreamRequest>,
) -> impl IntoResponse {
    let (id, rtsp_url) = match (req.id, req.rtsp_url) {
        (Some(id), Some(url)) => (id, url),
        _ => {
            return Error::Validation("id and rtspUrl are required".to_string())
                .into_response()
        }
    };

    match state.registry.add(&id, &rtsp_url).await {
        Ok(AddOutcome::Created(record)) => Json(stream_body(&record)).into_response(),
        Ok(AddOutcome::AlreadyExists(record)) => Json(json!({
            "message": "Stream already exists",
            "id": record.id,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.registry.remove(&id).await {
        Json(json!({ "message": "Stream stopped" })).into_response()
    } else {
        Error::NotFound("Stream not found".to_string()).into_response()
    }
}

/// Restart a stream.
///
/// Holds the connection across the teardown and the fixed re-registration
/// delay; the response reflects the re-added record or the relay error.
async fn restart_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.restart(&id).await {
        Ok(record) => Json(stream_body(&record)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Telemetry Handlers
// ========================================

async fn system_stats(State(state): State<AppState>) -> impl IntoResponse {
    let response = SystemStatsResponse {
        cpu: state.telemetry.cpu_usage_percent().await,
        memory: state.telemetry.memory_stats(),
        disk: state.telemetry.disk_stats(),
        uptime: state.telemetry.uptime_seconds(),
        streams: state.registry.len().await,
    };

    Json(response)
}
