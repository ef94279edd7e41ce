//! Client for the external point-to-point directions provider.
//!
//! This crate exposes a narrow capability — [`RouteProvider`] — that the rest
//! of the engine depends on. The production implementation
//! ([`DirectionsClient`]) performs one HTTP call per route request; tests and
//! callers that need scripted behaviour substitute their own implementation.
//!
//! Failures never escape as panics or transport exceptions: every outcome of
//! a routing call is an ordinary [`RouteResult`] value the caller must branch
//! on.

pub mod client;
pub mod polyline;

pub use client::{DirectionsClient, RoutingConfig, RoutingConfigError};

use triage_types::Coordinate;

/// One turn-by-turn instruction within a route.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteStep {
    /// Human-readable instruction text (e.g. "Turn left onto Avenida 24 de Julho")
    pub instruction: String,
    /// Distance covered by this step, in metres
    pub distance_meters: f64,
}

/// The summary of one successfully computed route.
///
/// Only the provider's first route (and its first segment's steps) is ever
/// represented here, even when the provider returns alternatives.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteSummary {
    /// Total driving distance in metres
    pub distance_meters: f64,
    /// Total driving duration in seconds
    pub duration_seconds: f64,
    /// Encoded polyline geometry of the route
    pub geometry: String,
    /// Ordered turn-by-turn instructions
    pub steps: Vec<RouteStep>,
}

/// Why a routing call produced no usable route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteFailure {
    /// The request never completed (connection refused, DNS failure, ...)
    #[error("transport error: {0}")]
    Transport(String),
    /// The per-call deadline elapsed
    #[error("routing call timed out")]
    Timeout,
    /// The provider answered with a non-success HTTP status
    #[error("provider returned HTTP status {0}")]
    Status(u16),
    /// The response body did not match the expected schema
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// The outcome of a single routing call: a summary or a typed failure,
/// never both and never partially populated.
pub type RouteResult = Result<RouteSummary, RouteFailure>;

/// Capability to compute a driving route between two coordinates.
///
/// Implementations perform exactly one attempt per call; retry policy, if
/// any, belongs to the caller and must preserve the per-call timeout.
#[async_trait::async_trait]
pub trait RouteProvider: Send + Sync {
    /// Computes a route from `origin` to `destination`.
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> RouteResult;
}
