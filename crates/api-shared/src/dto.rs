//! Wire types for the triage REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CoordinateDto {
    pub latitude: f64,
    pub longitude: f64,
}

/// A candidate care facility as supplied by the caller's persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacilityDto {
    /// Facility identity (UUID, canonical hyphenated form)
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Bed count; used only as the fallback ranking key
    pub capacity: u32,
}

/// One turn-by-turn instruction of a referral route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteStepDto {
    pub instruction: String,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassifyReq {
    /// Reported symptom codes; duplicates are collapsed before counting
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassifyRes {
    /// `"high"` or `"low"`
    pub risk_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveReq {
    pub patient: CoordinateDto,
    pub facilities: Vec<FacilityDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveRes {
    pub facility: FacilityDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntakeReq {
    pub symptoms: Vec<String>,
    pub patient: CoordinateDto,
    pub facilities: Vec<FacilityDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentRes {
    /// The deduplicated symptom set that was classified
    pub symptoms: Vec<String>,
    pub risk_level: String,
    /// Resolved facility identity; absent when resolution failed entirely
    pub facility_id: Option<String>,
    /// RFC 3339 timestamp of the assessment
    pub assessed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferralReq {
    pub patient: CoordinateDto,
    pub facility: FacilityDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferralRes {
    pub facility_id: String,
    pub facility_name: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub instructions: Vec<RouteStepDto>,
    /// Encoded polyline, for clients that render it directly
    pub geometry: String,
    /// Decoded path for map rendering
    pub path: Vec<CoordinateDto>,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub status: String,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_res_omits_nothing_on_round_trip() {
        let res = AssessmentRes {
            symptoms: vec!["febre".into()],
            risk_level: "low".into(),
            facility_id: None,
            assessed_at: "2026-08-08T12:00:00Z".into(),
        };

        let json = serde_json::to_string(&res).expect("serialise");
        let back: AssessmentRes = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back.facility_id, None);
        assert_eq!(back.risk_level, "low");
    }

    #[test]
    fn intake_req_parses_from_caller_json() {
        let req: IntakeReq = serde_json::from_str(
            r#"{
                "symptoms": ["diarreia_agua_de_arroz", "vomitos_frequentes"],
                "patient": {"latitude": -25.95, "longitude": 32.57},
                "facilities": [
                    {
                        "id": "6f7f3dc4-0f2f-4e24-9c8e-3a8fd1e5b3aa",
                        "name": "Hospital Central",
                        "latitude": -25.96,
                        "longitude": 32.58,
                        "capacity": 800
                    }
                ]
            }"#,
        )
        .expect("valid request JSON");

        assert_eq!(req.symptoms.len(), 2);
        assert_eq!(req.facilities[0].capacity, 800);
    }
}
