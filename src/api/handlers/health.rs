//! Health check endpoint handlers.
//!
//! The database check goes through [`Store::ping`](crate::repositories::Store::ping),
//! so it reports on whichever backend the process was started with.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health_check))
}

/// GET /health - Database and self checks
///
/// # Responses
/// - `200 OK` - every check is healthy
/// - `503 Service Unavailable` - at least one check is unhealthy
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let checks = vec![check_database(&state).await, check_self()];
    let response = HealthResponse::from_checks(checks, start.elapsed());

    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (status, Json(response))
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let backend = state.store.backend();
    let start = Instant::now();
    match state.store.ping().await {
        Ok(()) => ComponentHealth {
            name: "database".to_string(),
            status: HealthStatus::Healthy,
            description: Some(format!(
                "{} responded in {} ms",
                backend,
                start.elapsed().as_millis()
            )),
        },
        Err(e) => {
            tracing::error!(error = ?e, backend, "Health check could not reach the database");
            ComponentHealth {
                name: "database".to_string(),
                status: HealthStatus::Unhealthy,
                description: Some(format!("{} is unreachable", backend)),
            }
        }
    }
}

fn check_self() -> ComponentHealth {
    ComponentHealth {
        name: "self".to_string(),
        status: HealthStatus::Healthy,
        description: Some(format!("libris-rs {}", crate::pkg_version())),
    }
}
