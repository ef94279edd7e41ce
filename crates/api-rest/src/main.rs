//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the triage REST API on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the
//! REST server (with OpenAPI/Swagger UI). Deployments normally use the
//! workspace's main `triage-run` binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use routing::{client, DirectionsClient, RoutingConfig};
use triage_core::{
    config::resolve_vocabulary_path, EngineConfig, SymptomVocabulary, TriageOrchestrator,
};

/// Main entry point for the triage REST API server
///
/// Starts the REST API server on the configured address (default:
/// 0.0.0.0:3000) with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `TRIAGE_VOCABULARY`: Override path of the vocabulary YAML file
/// - `DIRECTIONS_BASE_URL`: Directions provider base URL
/// - `DIRECTIONS_API_KEY`: Static API key for the provider
/// - `DIRECTIONS_PROFILE`: Routing profile (default: "driving-car")
/// - `DIRECTIONS_TIMEOUT_SECS`: Per-call deadline in seconds (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the vocabulary file cannot be located or parsed,
/// - the directions client configuration is invalid, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting triage REST API on {}", addr);

    let vocabulary_override = std::env::var("TRIAGE_VOCABULARY").ok().map(PathBuf::from);
    let vocabulary_path = resolve_vocabulary_path(vocabulary_override)?;
    let vocabulary = SymptomVocabulary::load_from_file(&vocabulary_path)?;
    tracing::info!(
        "loaded {} symptom codes from {}",
        vocabulary.len(),
        vocabulary_path.display()
    );

    let base_url = std::env::var("DIRECTIONS_BASE_URL")
        .unwrap_or_else(|_| "https://api.openrouteservice.org".into());
    let api_key = match std::env::var("DIRECTIONS_API_KEY") {
        Ok(key) => key,
        Err(_) => anyhow::bail!("DIRECTIONS_API_KEY must be set"),
    };
    let profile =
        std::env::var("DIRECTIONS_PROFILE").unwrap_or_else(|_| client::DEFAULT_PROFILE.into());
    let timeout = match std::env::var("DIRECTIONS_TIMEOUT_SECS") {
        Ok(raw) => Duration::from_secs(raw.parse()?),
        Err(_) => client::DEFAULT_TIMEOUT,
    };

    let routing_cfg = RoutingConfig::new(base_url, api_key, profile, timeout)?;
    let provider = Arc::new(DirectionsClient::new(routing_cfg)?);

    let cfg = Arc::new(EngineConfig::new(
        vocabulary,
        triage_core::config::DEFAULT_MAX_CONCURRENT_ROUTES,
    )?);
    let state = AppState {
        orchestrator: Arc::new(TriageOrchestrator::new(cfg, provider)),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
