//! Application state
//!
//! Holds configuration and the shared components

use crate::stream_registry::StreamRegistry;
use crate::telemetry::TelemetrySampler;
use std::sync::Arc;
use std::time::Instant;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Relay control-plane base URL
    pub relay_api_url: String,
    /// Relay control-plane basic-auth user
    pub relay_user: String,
    /// Relay control-plane basic-auth password
    pub relay_pass: String,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            relay_api_url: std::env::var("RELAY_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:9997".to_string()),
            relay_user: std::env::var("RELAY_USER")
                .unwrap_or_else(|_| "admin".to_string()),
            relay_pass: std::env::var("RELAY_PASS")
                .unwrap_or_else(|_| "admin".to_string()),
            host: std::env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// StreamRegistry (relay-confirmed stream records)
    pub registry: Arc<StreamRegistry>,
    /// TelemetrySampler (host resource snapshots)
    pub telemetry: Arc<TelemetrySampler>,
    /// Process start time, for /health uptime
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        registry: Arc<StreamRegistry>,
        telemetry: Arc<TelemetrySampler>,
    ) -> Self {
        Self {
            config,
            registry,
            telemetry,
            started_at: Instant::now(),
        }
    }
}
