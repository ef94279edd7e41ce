//! Best-reachable-facility resolution.

use crate::{EngineConfig, Facility, TriageError, TriageResult};
use futures::stream::{self, StreamExt};
use routing::RouteProvider;
use std::sync::Arc;
use triage_types::Coordinate;

/// Resolves the best reachable facility for a patient location by querying
/// the directions provider once per candidate.
///
/// Candidates are queried with bounded concurrent fan-out. Selection is
/// computed from `(input index, distance)` pairs after every call settles, so
/// the result never depends on completion order: ties on distance are broken
/// by the earliest position in the input list.
///
/// No results are cached: every invocation re-queries the provider for every
/// candidate.
#[derive(Clone)]
pub struct FacilityDistanceResolver {
    cfg: Arc<EngineConfig>,
    provider: Arc<dyn RouteProvider>,
}

impl FacilityDistanceResolver {
    pub fn new(cfg: Arc<EngineConfig>, provider: Arc<dyn RouteProvider>) -> Self {
        Self { cfg, provider }
    }

    /// Resolves the referral facility for `patient` among `candidates`.
    ///
    /// Among candidates the provider can route to, the one with the minimal
    /// driving distance wins. If no routing call succeeds, the
    /// highest-capacity candidate from the original list is returned instead;
    /// an unreachable routing provider must not block referral entirely.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::NoFacilityAvailable` if `candidates` is empty —
    /// the only hard failure mode of resolution.
    pub async fn resolve(
        &self,
        patient: Coordinate,
        candidates: &[Facility],
    ) -> TriageResult<Facility> {
        if candidates.is_empty() {
            return Err(TriageError::NoFacilityAvailable);
        }

        let destinations: Vec<Coordinate> = candidates.iter().map(|f| f.coordinate).collect();
        let mut calls = stream::iter(destinations.into_iter().enumerate().map(|(index, destination)| {
            let provider = Arc::clone(&self.provider);
            async move { (index, provider.route(patient, destination).await) }
        }))
        .buffer_unordered(self.cfg.max_concurrent_routes());

        let mut reachable: Vec<(usize, f64)> = Vec::new();
        while let Some((index, result)) = calls.next().await {
            match result {
                Ok(summary) if summary.distance_meters.is_finite() => {
                    reachable.push((index, summary.distance_meters));
                }
                Ok(summary) => {
                    tracing::warn!(
                        facility = %candidates[index].id,
                        distance = summary.distance_meters,
                        "provider reported a non-finite distance; candidate treated as unreachable"
                    );
                }
                Err(failure) => {
                    tracing::warn!(
                        facility = %candidates[index].id,
                        %failure,
                        "routing call failed; candidate treated as unreachable"
                    );
                }
            }
        }

        let nearest = reachable.into_iter().fold(None, |best, (index, distance)| {
            match best {
                None => Some((index, distance)),
                Some((best_index, best_distance)) => {
                    if distance < best_distance
                        || (distance == best_distance && index < best_index)
                    {
                        Some((index, distance))
                    } else {
                        Some((best_index, best_distance))
                    }
                }
            }
        });

        if let Some((index, _)) = nearest {
            return Ok(candidates[index].clone());
        }

        // Fallback ranks the original candidate list by capacity; the
        // strictly-greater comparison keeps the earliest candidate on ties.
        let mut fallback = &candidates[0];
        for candidate in &candidates[1..] {
            if candidate.capacity > fallback.capacity {
                fallback = candidate;
            }
        }

        tracing::warn!(
            facility = %fallback.id,
            "no routing call succeeded; falling back to highest-capacity facility"
        );
        Ok(fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymptomVocabulary;
    use routing::{RouteFailure, RouteResult, RouteSummary};
    use std::collections::HashMap;
    use triage_types::SymptomCode;
    use uuid::Uuid;

    /// Scripted provider keyed by destination coordinate.
    struct ScriptedProvider {
        routes: HashMap<String, RouteResult>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                routes: HashMap::new(),
            }
        }

        fn key(destination: Coordinate) -> String {
            format!("{destination}")
        }

        fn succeed(mut self, destination: Coordinate, distance_meters: f64) -> Self {
            self.routes.insert(
                Self::key(destination),
                Ok(RouteSummary {
                    distance_meters,
                    duration_seconds: distance_meters / 10.0,
                    geometry: String::new(),
                    steps: vec![],
                }),
            );
            self
        }

        fn fail(mut self, destination: Coordinate, failure: RouteFailure) -> Self {
            self.routes.insert(Self::key(destination), Err(failure));
            self
        }
    }

    #[async_trait::async_trait]
    impl RouteProvider for ScriptedProvider {
        async fn route(&self, _origin: Coordinate, destination: Coordinate) -> RouteResult {
            self.routes
                .get(&Self::key(destination))
                .cloned()
                .unwrap_or(Err(RouteFailure::Transport("unscripted destination".into())))
        }
    }

    fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).expect("valid coordinate")
    }

    fn facility(name: &str, position: Coordinate, capacity: u32) -> Facility {
        Facility {
            id: Uuid::new_v4(),
            name: name.to_string(),
            coordinate: position,
            capacity,
        }
    }

    fn resolver(provider: ScriptedProvider) -> FacilityDistanceResolver {
        let vocabulary =
            SymptomVocabulary::from_entries([(SymptomCode::new("febre").unwrap(), false)])
                .expect("valid vocabulary");
        let cfg = EngineConfig::new(vocabulary, 4).expect("valid config");
        FacilityDistanceResolver::new(Arc::new(cfg), Arc::new(provider))
    }

    #[tokio::test]
    async fn picks_minimum_distance_among_reachable_candidates() {
        let near = coordinate(-25.96, 32.58);
        let far = coordinate(-25.90, 32.60);
        let provider = ScriptedProvider::new()
            .succeed(far, 500.0)
            .succeed(near, 300.0);

        let candidates = vec![
            facility("Hospital A", far, 100),
            facility("Hospital B", near, 10),
        ];
        let resolved = resolver(provider)
            .resolve(coordinate(-25.95, 32.57), &candidates)
            .await
            .expect("should resolve");

        assert_eq!(resolved, candidates[1]);
    }

    #[tokio::test]
    async fn breaks_distance_ties_by_input_order() {
        let first = coordinate(-25.96, 32.58);
        let second = coordinate(-25.90, 32.60);
        let provider = ScriptedProvider::new()
            .succeed(first, 450.0)
            .succeed(second, 450.0);

        let candidates = vec![
            facility("Hospital A", first, 5),
            facility("Hospital B", second, 500),
        ];
        let resolved = resolver(provider)
            .resolve(coordinate(-25.95, 32.57), &candidates)
            .await
            .expect("should resolve");

        assert_eq!(resolved, candidates[0]);
    }

    #[tokio::test]
    async fn failed_candidates_are_skipped_not_fatal() {
        let unreachable = coordinate(-25.96, 32.58);
        let reachable = coordinate(-25.90, 32.60);
        let provider = ScriptedProvider::new()
            .fail(unreachable, RouteFailure::Timeout)
            .succeed(reachable, 9000.0);

        let candidates = vec![
            facility("Hospital A", unreachable, 100),
            facility("Hospital B", reachable, 10),
        ];
        let resolved = resolver(provider)
            .resolve(coordinate(-25.95, 32.57), &candidates)
            .await
            .expect("should resolve");

        assert_eq!(resolved, candidates[1]);
    }

    #[tokio::test]
    async fn all_failures_fall_back_to_highest_capacity() {
        let a = coordinate(-25.96, 32.58);
        let b = coordinate(-25.90, 32.60);
        let provider = ScriptedProvider::new()
            .fail(a, RouteFailure::Status(502))
            .fail(b, RouteFailure::Transport("connection refused".into()));

        let candidates = vec![
            facility("Hospital A", a, 100),
            facility("Hospital B", b, 50),
        ];
        let resolved = resolver(provider)
            .resolve(coordinate(0.0, 0.0), &candidates)
            .await
            .expect("fallback should resolve");

        assert_eq!(resolved, candidates[0]);
    }

    #[tokio::test]
    async fn capacity_fallback_prefers_earliest_on_ties() {
        let a = coordinate(-25.96, 32.58);
        let b = coordinate(-25.90, 32.60);
        let provider = ScriptedProvider::new()
            .fail(a, RouteFailure::Timeout)
            .fail(b, RouteFailure::Timeout);

        let candidates = vec![
            facility("Hospital A", a, 75),
            facility("Hospital B", b, 75),
        ];
        let resolved = resolver(provider)
            .resolve(coordinate(0.0, 0.0), &candidates)
            .await
            .expect("fallback should resolve");

        assert_eq!(resolved, candidates[0]);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_a_hard_failure() {
        let err = resolver(ScriptedProvider::new())
            .resolve(coordinate(0.0, 0.0), &[])
            .await
            .expect_err("should fail without candidates");
        assert!(matches!(err, TriageError::NoFacilityAvailable));
    }

    #[tokio::test]
    async fn single_reachable_candidate_wins_over_larger_unreachable_ones() {
        let reachable = coordinate(-25.90, 32.60);
        let unreachable = coordinate(-25.96, 32.58);
        let provider = ScriptedProvider::new()
            .succeed(reachable, 12_000.0)
            .fail(unreachable, RouteFailure::Status(500));

        let candidates = vec![
            facility("Hospital Central", unreachable, 800),
            facility("Centro de Saude", reachable, 20),
        ];
        let resolved = resolver(provider)
            .resolve(coordinate(-25.95, 32.57), &candidates)
            .await
            .expect("should resolve");

        assert_eq!(resolved, candidates[1]);
    }
}
