//! Router configuration for the API.
//!
//! Routes are collected through `utoipa-axum` so the OpenAPI document is
//! generated from the same handler annotations that register them.

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::api::doc::{ApiDoc, OPENAPI_PATH};
use crate::api::handlers;
use crate::api::middleware::{
    REQUEST_ID_HEADER, global_error_handler, logging_middleware, request_id_middleware,
};
use crate::config::ServerConfig;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Last added runs first:
/// 1. Request ID - generates/propagates `x-request-id`
/// 2. Logging - logs requests with their id
/// 3. CORS, then response compression
/// 4. Global error handler - normalizes non-JSON error bodies
/// 5. Panic catcher - turns handler panics into 500s
///
/// # Routes
/// - `/api/{books,authors,categories,publishers,reviews}` - Catalog CRUD
/// - `/api/auth` - Registration, login, refresh, logout
/// - `/health` - Health checks
/// - `/api-docs/openapi.json` - Generated OpenAPI document
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = OpenApiRouter::new()
        .nest("/books", handlers::books::book_routes())
        .nest("/authors", handlers::authors::author_routes())
        .nest("/categories", handlers::categories::category_routes())
        .nest("/publishers", handlers::publishers::publisher_routes())
        .nest("/reviews", handlers::reviews::review_routes())
        .nest("/auth", handlers::auth::auth_routes(state.clone()));

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes)
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .route(
            OPENAPI_PATH,
            get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi) }
            }),
        )
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn(global_error_handler))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&server.cors_origins))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// `*` allows any origin; otherwise only the listed origins. An empty list
/// disables cross-origin access.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
