//! Author request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::ensure_same_id;
use crate::api::doc::AUTHOR_TAG;
use crate::api::dto::{BookResponse, AuthorDto, ErrorResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the author routes
///
/// # Routes
/// - `GET /`, `POST /`
/// - `GET /{id}`, `PUT /{id}`, `DELETE /{id}`
/// - `GET /{id}/books` - The author's books
pub fn author_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_authors, create_author))
        .routes(routes!(get_author, update_author, delete_author))
        .routes(routes!(list_author_books))
}

/// GET /api/authors - List all authors
#[utoipa::path(
    get,
    path = "/",
    tag = AUTHOR_TAG,
    responses(
        (status = 200, description = "All authors", body = Vec<AuthorDto>)
    )
)]
async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorDto>>> {
    let authors = state.services.authors.get_all_authors().await?;
    Ok(Json(authors.into_iter().map(AuthorDto::from).collect()))
}

/// GET /api/authors/{id} - Get one author
#[utoipa::path(
    get,
    path = "/{id}",
    tag = AUTHOR_TAG,
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "The author", body = AuthorDto),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
async fn get_author(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<AuthorDto>> {
    let author = state
        .services
        .authors
        .get_author_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("author", id))?;
    Ok(Json(author.into()))
}

/// POST /api/authors - Create an author
#[utoipa::path(
    post,
    path = "/",
    tag = AUTHOR_TAG,
    request_body = AuthorDto,
    responses(
        (status = 201, description = "Author created", body = AuthorDto),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    )
)]
async fn create_author(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AuthorDto>,
) -> AppResult<(StatusCode, Json<AuthorDto>)> {
    let author = state.services.authors.add_author(payload.into_new_author()).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// PUT /api/authors/{id} - Replace an author
#[utoipa::path(
    put,
    path = "/{id}",
    tag = AUTHOR_TAG,
    params(("id" = i32, Path, description = "Author id")),
    request_body = AuthorDto,
    responses(
        (status = 204, description = "Author updated"),
        (status = 400, description = "Id mismatch or invalid data", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AuthorDto>,
) -> AppResult<StatusCode> {
    ensure_same_id("Author", id, payload.id)?;
    state.services.authors.update_author(payload.into_author()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/authors/{id} - Delete an author
///
/// Fails while books still reference the author.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = AUTHOR_TAG,
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 400, description = "Author still has books", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
async fn delete_author(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.authors.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/authors/{id}/books - Books of one author
#[utoipa::path(
    get,
    path = "/{id}/books",
    tag = AUTHOR_TAG,
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Books with their details", body = Vec<BookResponse>),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
async fn list_author_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let graph = state.services.authors.get_author_with_books(id).await?;
    Ok(Json(graph.books.into_iter().map(BookResponse::from).collect()))
}
