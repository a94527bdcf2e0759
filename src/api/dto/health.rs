//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "status": "Healthy",
    "checks": [
        {"name": "database", "status": "Healthy", "description": "postgres responded"},
        {"name": "self", "status": "Healthy", "description": "libris-rs 0.1.0"}
    ],
    "totalDuration": "00:00:00.0042000"
}))]
pub struct HealthResponse {
    /// Worst status among the checks
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
    /// Wall time of all checks, formatted `hh:mm:ss.fffffff`
    pub total_duration: String,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some non-critical issues
    Degraded,
    /// Critical issues present
    Unhealthy,
}

/// Individual component health information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    #[schema(example = "database")]
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HealthResponse {
    /// Aggregates the checks; the overall status is the worst one.
    pub fn from_checks(checks: Vec<ComponentHealth>, total: std::time::Duration) -> Self {
        let status = checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self {
            status,
            checks,
            total_duration: format_duration(total),
        }
    }
}

fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:07}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        duration.subsec_nanos() / 100
    )
}
