//! HTTP client for an openrouteservice-compatible directions endpoint.

use crate::{RouteFailure, RouteProvider, RouteResult, RouteStep, RouteSummary};
use std::time::Duration;
use triage_types::Coordinate;

/// Default request profile; the engine only routes ambulances and patients
/// by road.
pub const DEFAULT_PROFILE: &str = "driving-car";

/// Default per-call deadline. The provider is untrusted and may hang.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while constructing a [`DirectionsClient`].
#[derive(Debug, thiserror::Error)]
pub enum RoutingConfigError {
    #[error("directions base URL cannot be empty")]
    EmptyBaseUrl,
    #[error("directions API key cannot be empty")]
    EmptyApiKey,
    #[error("directions profile cannot be empty")]
    EmptyProfile,
    #[error("directions timeout must be greater than zero")]
    ZeroTimeout,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
}

/// Connection settings for the external directions provider, resolved once at
/// startup and passed in explicitly.
#[derive(Clone, Debug)]
pub struct RoutingConfig {
    base_url: String,
    api_key: String,
    profile: String,
    timeout: Duration,
}

impl RoutingConfig {
    /// Create a new `RoutingConfig`.
    ///
    /// # Errors
    ///
    /// Returns a `RoutingConfigError` if any field is empty or the timeout is
    /// zero.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        profile: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RoutingConfigError> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        let profile = profile.into();

        if base_url.trim().is_empty() {
            return Err(RoutingConfigError::EmptyBaseUrl);
        }
        if api_key.trim().is_empty() {
            return Err(RoutingConfigError::EmptyApiKey);
        }
        if profile.trim().is_empty() {
            return Err(RoutingConfigError::EmptyProfile);
        }
        if timeout.is_zero() {
            return Err(RoutingConfigError::ZeroTimeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            profile,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Production [`RouteProvider`] backed by an openrouteservice-compatible HTTP
/// API.
///
/// Each call performs exactly one POST to
/// `{base_url}/v2/directions/{profile}` with the origin/destination pair as a
/// `[longitude, latitude]` waypoint list. There is no internal retry.
#[derive(Clone)]
pub struct DirectionsClient {
    cfg: RoutingConfig,
    http: reqwest::Client,
}

impl DirectionsClient {
    /// Create a new client from the given configuration.
    ///
    /// The per-call timeout is installed on the underlying HTTP client, so a
    /// hung provider surfaces as `RouteFailure::Timeout` rather than blocking
    /// the caller indefinitely.
    pub fn new(cfg: RoutingConfig) -> Result<Self, RoutingConfigError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(RoutingConfigError::HttpClient)?;

        Ok(Self { cfg, http })
    }

    fn directions_url(&self) -> String {
        format!("{}/v2/directions/{}", self.cfg.base_url, self.cfg.profile)
    }
}

#[async_trait::async_trait]
impl RouteProvider for DirectionsClient {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> RouteResult {
        // The provider expects [longitude, latitude] order.
        let body = DirectionsRequest {
            coordinates: [
                [origin.longitude(), origin.latitude()],
                [destination.longitude(), destination.latitude()],
            ],
        };

        let response = match self
            .http
            .post(self.directions_url())
            .header(reqwest::header::AUTHORIZATION, self.cfg.api_key.as_str())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(RouteFailure::Timeout),
            Err(e) => return Err(RouteFailure::Transport(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RouteFailure::Status(status.as_u16()));
        }

        let parsed: DirectionsResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) if e.is_timeout() => return Err(RouteFailure::Timeout),
            Err(e) => return Err(RouteFailure::MalformedResponse(e.to_string())),
        };

        summary_from_response(parsed)
    }
}

#[derive(serde::Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
}

#[derive(Debug, serde::Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct RouteEntry {
    summary: SummaryEntry,
    geometry: String,
    #[serde(default)]
    segments: Vec<SegmentEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct SummaryEntry {
    distance: f64,
    duration: f64,
}

#[derive(Debug, serde::Deserialize)]
struct SegmentEntry {
    #[serde(default)]
    steps: Vec<StepEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct StepEntry {
    instruction: String,
    distance: f64,
}

/// Extracts a [`RouteSummary`] from a parsed provider response.
///
/// Only the first route is used, and only the first segment's steps; a
/// response without any route is malformed. A route without segments (a
/// zero-length trip) yields an empty instruction list.
fn summary_from_response(response: DirectionsResponse) -> RouteResult {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RouteFailure::MalformedResponse("response contained no routes".into()))?;

    let steps = route
        .segments
        .into_iter()
        .next()
        .map(|segment| {
            segment
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    instruction: step.instruction,
                    distance_meters: step.distance,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RouteSummary {
        distance_meters: route.summary.distance,
        duration_seconds: route.summary.duration,
        geometry: route.geometry,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> RouteResult {
        let response: DirectionsResponse = serde_json::from_str(body).expect("valid JSON fixture");
        summary_from_response(response)
    }

    #[test]
    fn config_rejects_empty_base_url() {
        let err = RoutingConfig::new("", "key", DEFAULT_PROFILE, DEFAULT_TIMEOUT)
            .expect_err("should reject empty base URL");
        assert!(matches!(err, RoutingConfigError::EmptyBaseUrl));
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let err = RoutingConfig::new(
            "https://api.openrouteservice.org",
            "key",
            DEFAULT_PROFILE,
            Duration::ZERO,
        )
        .expect_err("should reject zero timeout");
        assert!(matches!(err, RoutingConfigError::ZeroTimeout));
    }

    #[test]
    fn config_strips_trailing_slash_from_base_url() {
        let cfg = RoutingConfig::new(
            "https://api.openrouteservice.org/",
            "key",
            DEFAULT_PROFILE,
            DEFAULT_TIMEOUT,
        )
        .expect("valid config");
        assert_eq!(cfg.base_url(), "https://api.openrouteservice.org");
    }

    #[test]
    fn summary_extracts_first_route_and_first_segment() {
        let summary = parse(
            r#"{
                "routes": [
                    {
                        "summary": {"distance": 1523.4, "duration": 312.7},
                        "geometry": "gfo}EtohhU",
                        "segments": [
                            {
                                "steps": [
                                    {"instruction": "Head north", "distance": 120.0},
                                    {"instruction": "Turn right", "distance": 1403.4}
                                ]
                            },
                            {"steps": [{"instruction": "ignored", "distance": 1.0}]}
                        ]
                    },
                    {
                        "summary": {"distance": 9999.0, "duration": 9999.0},
                        "geometry": "alternative",
                        "segments": []
                    }
                ]
            }"#,
        )
        .expect("should parse");

        assert_eq!(summary.distance_meters, 1523.4);
        assert_eq!(summary.duration_seconds, 312.7);
        assert_eq!(summary.geometry, "gfo}EtohhU");
        assert_eq!(summary.steps.len(), 2);
        assert_eq!(summary.steps[0].instruction, "Head north");
        assert_eq!(summary.steps[1].distance_meters, 1403.4);
    }

    #[test]
    fn summary_without_segments_yields_empty_steps() {
        let summary = parse(
            r#"{
                "routes": [
                    {
                        "summary": {"distance": 0.0, "duration": 0.0},
                        "geometry": "",
                        "segments": []
                    }
                ]
            }"#,
        )
        .expect("should parse");
        assert!(summary.steps.is_empty());
    }

    #[test]
    fn empty_route_list_is_malformed() {
        let err = parse(r#"{"routes": []}"#).expect_err("should fail");
        assert!(matches!(err, RouteFailure::MalformedResponse(msg) if msg.contains("no routes")));
    }

    #[test]
    fn missing_routes_key_is_malformed() {
        let err = parse(r#"{}"#).expect_err("should fail");
        assert!(matches!(err, RouteFailure::MalformedResponse(_)));
    }
}
