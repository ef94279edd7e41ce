//! Main runner binary for the triage and referral resolution engine.
//!
//! Resolves configuration from the environment once at startup, builds the
//! immutable engine configuration and the directions client, and serves the
//! REST API from `api-rest`. The surrounding hospital administration
//! application calls the API synchronously from its request handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use routing::{client, DirectionsClient, RoutingConfig};
use triage_core::{
    config::resolve_vocabulary_path, EngineConfig, SymptomVocabulary, TriageOrchestrator,
};

/// Main entry point for the triage engine
///
/// Serves the REST API (with OpenAPI/Swagger documentation) on the
/// configured address.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `TRIAGE_VOCABULARY`: Override path of the vocabulary YAML file
/// - `TRIAGE_MAX_CONCURRENT_ROUTES`: Bound on concurrent routing calls
///   during facility resolution (default: 4)
/// - `DIRECTIONS_BASE_URL`: Directions provider base URL
/// - `DIRECTIONS_API_KEY`: Static API key for the provider (required)
/// - `DIRECTIONS_PROFILE`: Routing profile (default: "driving-car")
/// - `DIRECTIONS_TIMEOUT_SECS`: Per-call deadline in seconds (default: 10)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting triage engine on {}", addr);

    let vocabulary_override = std::env::var("TRIAGE_VOCABULARY").ok().map(PathBuf::from);
    let vocabulary_path = resolve_vocabulary_path(vocabulary_override)?;
    let vocabulary = SymptomVocabulary::load_from_file(&vocabulary_path)?;
    tracing::info!(
        "loaded {} symptom codes ({} critical) from {}",
        vocabulary.len(),
        vocabulary.critical_codes().count(),
        vocabulary_path.display()
    );

    let max_concurrent_routes = match std::env::var("TRIAGE_MAX_CONCURRENT_ROUTES") {
        Ok(raw) => raw.parse()?,
        Err(_) => triage_core::config::DEFAULT_MAX_CONCURRENT_ROUTES,
    };

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
    tracing::info!(
        "directions provider: {} (profile {}, timeout {:?})",
        routing_cfg.base_url(),
        routing_cfg.profile(),
        routing_cfg.timeout()
    );
    let provider = Arc::new(DirectionsClient::new(routing_cfg)?);

    let cfg = Arc::new(EngineConfig::new(vocabulary, max_concurrent_routes)?);
    let state = AppState {
        orchestrator: Arc::new(TriageOrchestrator::new(cfg, provider)),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
