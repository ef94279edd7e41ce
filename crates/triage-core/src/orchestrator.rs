//! Intake and referral orchestration.
//!
//! Composes the classifier and the facility resolver into the two operations
//! the surrounding CRUD layer consumes: `intake` (produce a persistable
//! assessment) and `referral` (produce a displayable route description for an
//! already-assigned facility).

use crate::{
    EngineConfig, Facility, FacilityDistanceResolver, RiskClassifier, TriageError, TriageResult,
};
use chrono::{DateTime, Utc};
use routing::{polyline, RouteFailure, RouteProvider, RouteStep};
use std::collections::BTreeSet;
use std::sync::Arc;
use triage_types::{Coordinate, RiskLevel, SymptomCode};
use uuid::Uuid;

/// The persisted outcome of one intake operation.
///
/// Created once per intake call and never mutated afterwards; a
/// re-assessment produces a new `Assessment`, preserving history. The
/// surrounding persistence layer stores it (and encrypts sensitive patient
/// fields at rest — outside the engine's responsibility).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Assessment {
    /// The deduplicated, validated symptom set that was classified
    pub symptoms: BTreeSet<SymptomCode>,
    pub risk_level: RiskLevel,
    /// Identity of the resolved facility; `None` when resolution failed
    /// entirely but the classification is still clinically meaningful
    pub facility_id: Option<Uuid>,
    pub assessed_at: DateTime<Utc>,
}

/// A displayable route from a patient to their assigned facility.
///
/// Derived on demand from a single routing call and never cached or
/// persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Referral {
    pub facility_id: Uuid,
    pub facility_name: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Ordered turn-by-turn instructions for step-by-step display
    pub instructions: Vec<RouteStep>,
    /// The provider's encoded polyline, kept for clients that render it
    /// directly
    pub geometry: String,
    /// The decoded path for map rendering
    pub path: Vec<Coordinate>,
}

/// Front door of the engine: composes [`RiskClassifier`] and
/// [`FacilityDistanceResolver`] behind the two inbound operations.
#[derive(Clone)]
pub struct TriageOrchestrator {
    classifier: RiskClassifier,
    resolver: FacilityDistanceResolver,
    provider: Arc<dyn RouteProvider>,
}

impl TriageOrchestrator {
    pub fn new(cfg: Arc<EngineConfig>, provider: Arc<dyn RouteProvider>) -> Self {
        Self {
            classifier: RiskClassifier::new(Arc::clone(&cfg)),
            resolver: FacilityDistanceResolver::new(cfg, Arc::clone(&provider)),
            provider,
        }
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &FacilityDistanceResolver {
        &self.resolver
    }

    /// Performs a full intake: classify the reported symptoms, then resolve
    /// the best reachable facility.
    ///
    /// Classification failures abort the intake before any routing call is
    /// made. Facility resolution failing with `NoFacilityAvailable` does NOT
    /// abort: the risk level is clinically meaningful even without an
    /// assignment, so the assessment is produced with `facility_id: None`.
    ///
    /// # Errors
    ///
    /// Returns the classifier's `EmptySymptoms`/`UnknownSymptoms` validation
    /// errors unchanged.
    pub async fn intake(
        &self,
        symptoms: &[SymptomCode],
        patient: Coordinate,
        candidates: &[Facility],
    ) -> TriageResult<Assessment> {
        let risk_level = self.classifier.classify(symptoms)?;

        let facility_id = match self.resolver.resolve(patient, candidates).await {
            Ok(facility) => Some(facility.id),
            Err(TriageError::NoFacilityAvailable) => {
                tracing::warn!("no facility available; assessment recorded without an assignment");
                None
            }
            Err(other) => return Err(other),
        };

        Ok(Assessment {
            symptoms: symptoms.iter().cloned().collect(),
            risk_level,
            facility_id,
            assessed_at: Utc::now(),
        })
    }

    /// Produces the route description from `patient` to their already
    /// assigned `facility`.
    ///
    /// Exactly one routing call is made. Unlike intake there is no fallback:
    /// a referral for an assigned facility has no alternative candidate, so
    /// any failure — including a geometry that cannot be decoded for
    /// rendering — surfaces as `TriageError::RouteUnavailable`.
    pub async fn referral(
        &self,
        patient: Coordinate,
        facility: &Facility,
    ) -> TriageResult<Referral> {
        let summary = self
            .provider
            .route(patient, facility.coordinate)
            .await
            .map_err(TriageError::RouteUnavailable)?;

        let path = polyline::decode(&summary.geometry).map_err(|e| {
            TriageError::RouteUnavailable(RouteFailure::MalformedResponse(e.to_string()))
        })?;

        Ok(Referral {
            facility_id: facility.id,
            facility_name: facility.name.clone(),
            distance_meters: summary.distance_meters,
            duration_seconds: summary.duration_seconds,
            instructions: summary.steps,
            geometry: summary.geometry,
            path,
        })
    }
}
