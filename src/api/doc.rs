use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const BOOK_TAG: &str = "Books";
pub const AUTHOR_TAG: &str = "Authors";
pub const CATEGORY_TAG: &str = "Categories";
pub const PUBLISHER_TAG: &str = "Publishers";
pub const REVIEW_TAG: &str = "Reviews";
pub const AUTH_TAG: &str = "Auth";
pub const HEALTH_TAG: &str = "Health";

/// Path the generated document is served from.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris",
        description = "Library catalog API: books, authors, categories, publishers and reviews",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::error::ValidationFieldError,
        )
    ),
    tags(
        (name = BOOK_TAG, description = "Book catalog endpoints"),
        (name = AUTHOR_TAG, description = "Author endpoints"),
        (name = CATEGORY_TAG, description = "Category endpoints"),
        (name = PUBLISHER_TAG, description = "Publisher endpoints"),
        (name = REVIEW_TAG, description = "Review endpoints"),
        (name = AUTH_TAG, description = "Authentication endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer Token Authentication"))
                        .build(),
                ),
            )
        }
    }
}
