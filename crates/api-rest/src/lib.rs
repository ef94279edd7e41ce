//! # API REST
//!
//! REST surface of the triage and referral resolution engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (DTO conversion, error-to-status mapping, CORS)
//!
//! Uses `api-shared` for wire types; all decision logic lives in
//! `triage-core`. The surrounding CRUD application calls these endpoints
//! synchronously from its request handlers.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::{
    AssessmentRes, ClassifyReq, ClassifyRes, CoordinateDto, ErrorRes, FacilityDto, HealthRes,
    HealthService, IntakeReq, ReferralReq, ReferralRes, ResolveReq, ResolveRes, RouteStepDto,
};
use triage_core::{Assessment, Facility, Referral, TriageError, TriageOrchestrator};
use triage_types::{Coordinate, SymptomCode};

/// Application state shared across REST API handlers.
///
/// Holds the engine front door; the orchestrator is cheap to share and owns
/// the classifier, the resolver, and the routing provider.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TriageOrchestrator>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, classify, resolve, intake, referral),
    components(schemas(
        HealthRes,
        ErrorRes,
        CoordinateDto,
        FacilityDto,
        RouteStepDto,
        ClassifyReq,
        ClassifyRes,
        ResolveReq,
        ResolveRes,
        IntakeReq,
        AssessmentRes,
        ReferralReq,
        ReferralRes,
    ))
)]
pub struct ApiDoc;

/// Builds the engine's REST router, including the Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/triage/classify", post(classify))
        .route("/triage/resolve", post(resolve))
        .route("/triage/intake", post(intake))
        .route("/triage/referral", post(referral))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Request-level failures, mapped onto HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be converted into domain types
    BadRequest(String),
    /// The engine rejected or failed the operation
    Triage(TriageError),
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        ApiError::Triage(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Triage(err) => {
                let status = match &err {
                    TriageError::EmptySymptoms | TriageError::UnknownSymptoms(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    TriageError::NoFacilityAvailable => StatusCode::NOT_FOUND,
                    TriageError::RouteUnavailable(_) => StatusCode::BAD_GATEWAY,
                    TriageError::ConfigRead(_)
                    | TriageError::ConfigParse(_)
                    | TriageError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        }

        let body = Json(ErrorRes {
            status: "error".into(),
            message,
        });
        (status, body).into_response()
    }
}

fn parse_symptoms(raw: &[String]) -> Result<Vec<SymptomCode>, ApiError> {
    raw.iter()
        .map(|code| {
            SymptomCode::new(code)
                .map_err(|e| ApiError::BadRequest(format!("invalid symptom code {code:?}: {e}")))
        })
        .collect()
}

fn coordinate_from_dto(dto: CoordinateDto) -> Result<Coordinate, ApiError> {
    Coordinate::new(dto.latitude, dto.longitude).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn facility_from_dto(dto: &FacilityDto) -> Result<Facility, ApiError> {
    let id = Uuid::parse_str(&dto.id)
        .map_err(|e| ApiError::BadRequest(format!("invalid facility id {:?}: {e}", dto.id)))?;
    let coordinate = Coordinate::new(dto.latitude, dto.longitude)
        .map_err(|e| ApiError::BadRequest(format!("facility {:?}: {e}", dto.id)))?;

    Ok(Facility {
        id,
        name: dto.name.clone(),
        coordinate,
        capacity: dto.capacity,
    })
}

fn facility_to_dto(facility: &Facility) -> FacilityDto {
    FacilityDto {
        id: facility.id.to_string(),
        name: facility.name.clone(),
        latitude: facility.coordinate.latitude(),
        longitude: facility.coordinate.longitude(),
        capacity: facility.capacity,
    }
}

fn facilities_from_dto(dtos: &[FacilityDto]) -> Result<Vec<Facility>, ApiError> {
    dtos.iter().map(facility_from_dto).collect()
}

fn assessment_to_res(assessment: Assessment) -> AssessmentRes {
    AssessmentRes {
        symptoms: assessment
            .symptoms
            .iter()
            .map(|code| code.as_str().to_string())
            .collect(),
        risk_level: assessment.risk_level.to_string(),
        facility_id: assessment.facility_id.map(|id| id.to_string()),
        assessed_at: assessment.assessed_at.to_rfc3339(),
    }
}

fn referral_to_res(referral: Referral) -> ReferralRes {
    ReferralRes {
        facility_id: referral.facility_id.to_string(),
        facility_name: referral.facility_name,
        distance_meters: referral.distance_meters,
        duration_seconds: referral.duration_seconds,
        instructions: referral
            .instructions
            .into_iter()
            .map(|step| RouteStepDto {
                instruction: step.instruction,
                distance_meters: step.distance_meters,
            })
            .collect(),
        geometry: referral.geometry,
        path: referral
            .path
            .into_iter()
            .map(|position| CoordinateDto {
                latitude: position.latitude(),
                longitude: position.longitude(),
            })
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/triage/classify",
    request_body = ClassifyReq,
    responses(
        (status = 200, description = "Computed risk level", body = ClassifyRes),
        (status = 422, description = "Empty or unknown symptom codes", body = ErrorRes)
    )
)]
/// Classifies a set of reported symptom codes against the configured
/// vocabulary.
#[axum::debug_handler]
async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyReq>,
) -> Result<Json<ClassifyRes>, ApiError> {
    let symptoms = parse_symptoms(&req.symptoms)?;
    let risk_level = state.orchestrator.classifier().classify(&symptoms)?;

    Ok(Json(ClassifyRes {
        risk_level: risk_level.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/triage/resolve",
    request_body = ResolveReq,
    responses(
        (status = 200, description = "Best reachable facility", body = ResolveRes),
        (status = 404, description = "No candidate facility available", body = ErrorRes)
    )
)]
/// Resolves the best reachable facility for a patient location among the
/// supplied candidates.
#[axum::debug_handler]
async fn resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveReq>,
) -> Result<Json<ResolveRes>, ApiError> {
    let patient = coordinate_from_dto(req.patient)?;
    let candidates = facilities_from_dto(&req.facilities)?;
    let facility = state
        .orchestrator
        .resolver()
        .resolve(patient, &candidates)
        .await?;

    Ok(Json(ResolveRes {
        facility: facility_to_dto(&facility),
    }))
}

#[utoipa::path(
    post,
    path = "/triage/intake",
    request_body = IntakeReq,
    responses(
        (status = 200, description = "Assessment for persistence by the caller", body = AssessmentRes),
        (status = 422, description = "Empty or unknown symptom codes", body = ErrorRes)
    )
)]
/// Performs a full intake: classification plus facility resolution.
///
/// Resolution failure degrades to an assessment without a facility
/// assignment; classification failure rejects the request.
#[axum::debug_handler]
async fn intake(
    State(state): State<AppState>,
    Json(req): Json<IntakeReq>,
) -> Result<Json<AssessmentRes>, ApiError> {
    let symptoms = parse_symptoms(&req.symptoms)?;
    let patient = coordinate_from_dto(req.patient)?;
    let candidates = facilities_from_dto(&req.facilities)?;

    let assessment = state
        .orchestrator
        .intake(&symptoms, patient, &candidates)
        .await?;

    Ok(Json(assessment_to_res(assessment)))
}

#[utoipa::path(
    post,
    path = "/triage/referral",
    request_body = ReferralReq,
    responses(
        (status = 200, description = "Route description for display", body = ReferralRes),
        (status = 502, description = "Route to the assigned facility unavailable", body = ErrorRes)
    )
)]
/// Produces the displayable route from a patient to their assigned facility.
#[axum::debug_handler]
async fn referral(
    State(state): State<AppState>,
    Json(req): Json<ReferralReq>,
) -> Result<Json<ReferralRes>, ApiError> {
    let patient = coordinate_from_dto(req.patient)?;
    let facility = facility_from_dto(&req.facility)?;

    let referral = state.orchestrator.referral(patient, &facility).await?;

    Ok(Json(referral_to_res(referral)))
}
