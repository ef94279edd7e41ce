//! Validated value types shared across the triage engine.
//!
//! These types guarantee their invariants at construction time so the rest of
//! the engine never has to re-check them: a `SymptomCode` is always a
//! normalised, non-empty identifier and a `Coordinate` is always a finite
//! WGS84 position.

/// Errors that can occur when creating a validated symptom code.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    /// The input code was empty or contained only whitespace
    #[error("Symptom code cannot be empty")]
    Empty,
}

/// An opaque symptom identifier drawn from the configured vocabulary.
///
/// The input is trimmed and lowercased during construction so that vocabulary
/// lookups are case-insensitive by construction. Codes are ordered, which
/// gives symptom sets (`BTreeSet<SymptomCode>`) a deterministic iteration
/// order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymptomCode(String);

impl SymptomCode {
    /// Creates a new `SymptomCode` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace and lowercased.
    /// If the trimmed result is empty, an error is returned.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SymptomCode)` for non-empty input, or `Err(CodeError::Empty)`
    /// if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, CodeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CodeError::Empty);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the inner code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymptomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SymptomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for SymptomCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SymptomCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SymptomCode::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when creating a validated coordinate.
#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    /// A component was NaN or infinite
    #[error("Coordinate components must be finite numbers")]
    NotFinite,
    /// Latitude outside [-90, 90]
    #[error("Latitude {0} is outside the valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside [-180, 180]
    #[error("Longitude {0} is outside the valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 position in decimal degrees.
///
/// Used for both patient locations and facility locations. Construction
/// guarantees both components are finite and within range.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a new `Coordinate`.
    ///
    /// # Errors
    ///
    /// Returns a `CoordinateError` if either component is non-finite or out of
    /// the WGS84 range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl<'de> serde::Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

/// The discrete risk classification produced by triage.
///
/// The system recognises exactly two levels; the classifier is the only
/// producer of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    /// Returns the lowercase wire representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
