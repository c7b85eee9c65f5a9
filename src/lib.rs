//! camrelay - RTSP camera stream registry and relay mediator
//!
//! ## Components
//!
//! 1. RelayClient - media relay control-plane adapter (path add/delete)
//! 2. StreamRegistry - authoritative in-memory stream state
//! 3. TelemetrySampler - host CPU/memory/disk/uptime snapshots
//! 4. WebAPI - REST API endpoints
//!
//! ## Design Principles
//!
//! - The registry is the single source of truth for registered streams
//! - A record exists only after the relay confirmed the registration
//! - Telemetry never fails a request; sampling failures degrade to zeros

pub mod error;
pub mod models;
pub mod relay_client;
pub mod state;
pub mod stream_registry;
pub mod telemetry;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
