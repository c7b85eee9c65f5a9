//! Shared data models for the HTTP surface

use crate::telemetry::ResourceStats;
use serde::{Deserialize, Serialize};

/// Create stream request
///
/// Fields are optional so missing keys surface as a 400 with a message
/// instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CreateStreamRequest {
    pub id: Option<String>,
    #[serde(rename = "rtspUrl")]
    pub rtsp_url: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub streams: usize,
    pub uptime: u64,
}

/// System stats response
#[derive(Debug, Serialize)]
pub struct SystemStatsResponse {
    pub cpu: u8,
    pub memory: ResourceStats,
    pub disk: ResourceStats,
    pub uptime: u64,
    pub streams: usize,
}

/// Static server metadata
#[derive(Debug, Serialize)]
pub struct ServerInfoResponse {
    pub name: String,
    pub version: String,
    pub streams: usize,
    pub ports: PortsInfo,
}

/// Well-known service ports (API plus relay media endpoints)
#[derive(Debug, Serialize)]
pub struct PortsInfo {
    pub api: u16,
    pub rtsp: u16,
    pub hls: u16,
    pub webrtc: u16,
}
