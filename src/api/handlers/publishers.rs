//! Publisher request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::ensure_same_id;
use crate::api::doc::PUBLISHER_TAG;
use crate::api::dto::{BookResponse, PublisherDto, ErrorResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

pub fn publisher_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_publishers, create_publisher))
        .routes(routes!(get_publisher, update_publisher, delete_publisher))
        .routes(routes!(list_publisher_books))
}

/// GET /api/publishers - List all publishers
#[utoipa::path(
    get,
    path = "/",
    tag = PUBLISHER_TAG,
    responses(
        (status = 200, description = "All publishers", body = Vec<PublisherDto>)
    )
)]
async fn list_publishers(State(state): State<AppState>) -> AppResult<Json<Vec<PublisherDto>>> {
    let publishers = state.services.publishers.get_all_publishers().await?;
    Ok(Json(publishers.into_iter().map(PublisherDto::from).collect()))
}

/// GET /api/publishers/{id} - Get one publisher
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PUBLISHER_TAG,
    params(("id" = i32, Path, description = "Publisher id")),
    responses(
        (status = 200, description = "The publisher", body = PublisherDto),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
async fn get_publisher(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<PublisherDto>> {
    let publisher = state
        .services
        .publishers
        .get_publisher_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("publisher", id))?;
    Ok(Json(publisher.into()))
}

/// POST /api/publishers - Create a publisher
#[utoipa::path(
    post,
    path = "/",
    tag = PUBLISHER_TAG,
    request_body = PublisherDto,
    responses(
        (status = 201, description = "Publisher created", body = PublisherDto),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    )
)]
async fn create_publisher(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PublisherDto>,
) -> AppResult<(StatusCode, Json<PublisherDto>)> {
    let publisher = state.services.publishers.add_publisher(payload.into_new_publisher()).await?;
    Ok((StatusCode::CREATED, Json(publisher.into())))
}

/// PUT /api/publishers/{id} - Replace a publisher
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PUBLISHER_TAG,
    params(("id" = i32, Path, description = "Publisher id")),
    request_body = PublisherDto,
    responses(
        (status = 204, description = "Publisher updated"),
        (status = 400, description = "Id mismatch or invalid data", body = ErrorResponse),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
async fn update_publisher(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<PublisherDto>,
) -> AppResult<StatusCode> {
    ensure_same_id("Publisher", id, payload.id)?;
    state.services.publishers.update_publisher(payload.into_publisher()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/publishers/{id} - Delete a publisher
///
/// Fails while books still reference the publisher.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PUBLISHER_TAG,
    params(("id" = i32, Path, description = "Publisher id")),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 400, description = "Publisher still has books", body = ErrorResponse),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
async fn delete_publisher(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.publishers.delete_publisher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/publishers/{id}/books - Books of one publisher
#[utoipa::path(
    get,
    path = "/{id}/books",
    tag = PUBLISHER_TAG,
    params(("id" = i32, Path, description = "Publisher id")),
    responses(
        (status = 200, description = "Books with their details", body = Vec<BookResponse>),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
async fn list_publisher_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let graph = state.services.publishers.get_publisher_with_books(id).await?;
    Ok(Json(graph.books.into_iter().map(BookResponse::from).collect()))
}
