use crate::dto::HealthRes;

/// Simple health service used by the REST API.
///
/// This service provides a standardised way to check the health status of EverVault.
#[derive(Clone, Debug)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "EverVault is alive".into(),
        }
    }
}
