//! # Triage Core
//!
//! Core decision logic for the triage and referral resolution engine:
//! - Risk classification from reported symptom codes
//! - Best-reachable-facility resolution via the external directions provider
//! - Intake and referral orchestration producing persistable assessments
//!
//! **No API concerns**: HTTP endpoints, serialisation of request/response
//! bodies, and server wiring belong in `api-rest` and `api-shared`. The
//! engine receives facility read models from the surrounding persistence
//! layer and returns assessments for it to store; it never queries a
//! database itself.

pub mod classifier;
pub mod config;
pub mod orchestrator;
pub mod resolver;

pub use classifier::{RiskClassifier, HIGH_RISK_CRITICAL_THRESHOLD};
pub use config::{EngineConfig, SymptomVocabulary};
pub use orchestrator::{Assessment, Referral, TriageOrchestrator};
pub use resolver::FacilityDistanceResolver;

use triage_types::{Coordinate, SymptomCode};
use uuid::Uuid;

/// A candidate care facility, supplied as a read model by the surrounding
/// persistence layer. The engine treats facilities as read-only input;
/// `capacity` (bed count) is used only as the fallback ranking key.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub coordinate: Coordinate,
    pub capacity: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("at least one symptom is required")]
    EmptySymptoms,
    #[error("symptoms not present in the vocabulary: {}", join_codes(.0))]
    UnknownSymptoms(Vec<SymptomCode>),
    #[error("no facility available for referral")]
    NoFacilityAvailable,
    #[error("route to assigned facility unavailable: {0}")]
    RouteUnavailable(routing::RouteFailure),
    #[error("failed to read vocabulary file: {0}")]
    ConfigRead(std::io::Error),
    #[error("failed to parse vocabulary file: {0}")]
    ConfigParse(serde_yaml::Error),
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;

fn join_codes(codes: &[SymptomCode]) -> String {
    codes
        .iter()
        .map(SymptomCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
