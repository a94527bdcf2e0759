//! Category request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::ensure_same_id;
use crate::api::doc::CATEGORY_TAG;
use crate::api::dto::{BookResponse, CategoryDto, ErrorResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Category CRUD plus `GET /{id}/books`.
pub fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_categories, create_category))
        .routes(routes!(get_category, update_category, delete_category))
        .routes(routes!(list_category_books))
}

/// GET /api/categories - List all categories
#[utoipa::path(
    get,
    path = "/",
    tag = CATEGORY_TAG,
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryDto>)
    )
)]
async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryDto>>> {
    let categories = state.services.categories.get_all_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

/// GET /api/categories/{id} - Get one category
#[utoipa::path(
    get,
    path = "/{id}",
    tag = CATEGORY_TAG,
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = CategoryDto),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn get_category(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<CategoryDto>> {
    let category = state
        .services
        .categories
        .get_category_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("category", id))?;
    Ok(Json(category.into()))
}

/// POST /api/categories - Create a category
#[utoipa::path(
    post,
    path = "/",
    tag = CATEGORY_TAG,
    request_body = CategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    )
)]
async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    let category = state.services.categories.add_category(payload.into_new_category()).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// PUT /api/categories/{id} - Replace a category
#[utoipa::path(
    put,
    path = "/{id}",
    tag = CATEGORY_TAG,
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryDto,
    responses(
        (status = 204, description = "Category updated"),
        (status = 400, description = "Id mismatch or invalid data", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CategoryDto>,
) -> AppResult<StatusCode> {
    ensure_same_id("Category", id, payload.id)?;
    state.services.categories.update_category(payload.into_category()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/categories/{id} - Delete a category
///
/// Fails while books still reference the category.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = CATEGORY_TAG,
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has books", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn delete_category(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.categories.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/categories/{id}/books - Books of one category
#[utoipa::path(
    get,
    path = "/{id}/books",
    tag = CATEGORY_TAG,
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Books with their details", body = Vec<BookResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn list_category_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let graph = state.services.categories.get_category_with_books(id).await?;
    Ok(Json(graph.books.into_iter().map(BookResponse::from).collect()))
}
