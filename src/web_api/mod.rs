//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Request validation
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::{HealthResponse, PortsInfo, ServerInfoResponse};
use crate::state::AppState;

// Relay media ports, reported for dashboard consumption
const RTSP_PORT: u16 = 8554;
const HLS_PORT: u16 = 8888;
const WEBRTC_PORT: u16 = 8889;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        streams: state.registry.len().await,
        uptime: state.started_at.elapsed().as_secs(),
    };

    Json(response)
}

/// Static server metadata
pub async fn server_info(State(state): State<AppState>) -> impl IntoResponse {
    let response = ServerInfoResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        streams: state.registry.len().await,
        ports: PortsInfo {
            api: state.config.port,
            rtsp: RTSP_PORT,
            hls: HLS_PORT,
            webrtc: WEBRTC_PORT,
        },
    };

    Json(response)
}
