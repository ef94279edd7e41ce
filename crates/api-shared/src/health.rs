use crate::dto::HealthRes;

/// Simple health service shared by the REST API and the runner binary.
///
/// This service provides a standardised way to check the health status of the
/// triage engine. It can be used both as a static utility and as an
/// instantiated service.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    ///
    /// # Returns
    /// A new `HealthService` instance.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// This is the preferred method for health checks as it doesn't require
    /// instantiating the service.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Triage engine is alive".into(),
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}
