//! camrelay - RTSP camera stream registry and relay mediator
//!
//! Main entry point.

use camrelay::{
    relay_client::RelayClient,
    state::{AppConfig, AppState},
    stream_registry::StreamRegistry,
    telemetry::TelemetrySampler,
    web_api,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camrelay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting camrelay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        relay_api_url = %config.relay_api_url,
        host = %config.host,
        port = config.port,
        "Configuration loaded"
    );

    // Initialize components
    let relay = Arc::new(RelayClient::new(
        config.relay_api_url.clone(),
        config.relay_user.clone(),
        config.relay_pass.clone(),
    )?);
    let registry = Arc::new(StreamRegistry::new(relay));
    let telemetry = Arc::new(TelemetrySampler::new());
    tracing::info!("StreamRegistry and TelemetrySampler initialized");

    let state = AppState::new(config, registry, telemetry);

    // The dashboard is served by another process, so CORS stays permissive
    let app = web_api::create_router(state.clone())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
