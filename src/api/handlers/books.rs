//! Book request handlers, including the filtered listing and the per-book
//! review and rating reads.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::ensure_same_id;
use crate::api::doc::BOOK_TAG;
use crate::api::dto::{
    BookQuery, BookRequest, BookResponse, ErrorResponse, RatingResponse, ReviewResponse,
};
use crate::error::{AppError, AppResult};
use crate::repositories::BookFilter;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the book routes
///
/// # Routes
/// - `GET /` - List books, optionally filtered
/// - `POST /` - Create a book
/// - `GET /{id}` - Get a book
/// - `PUT /{id}` - Replace a book
/// - `DELETE /{id}` - Delete a book and its reviews
/// - `GET /{id}/reviews` - Reviews of a book
/// - `GET /{id}/rating` - Average rating of a book
pub fn book_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_books, create_book))
        .routes(routes!(get_book, update_book, delete_book))
        .routes(routes!(list_book_reviews))
        .routes(routes!(get_book_rating))
}

/// GET /api/books - List books with author, category and publisher
#[utoipa::path(
    get,
    path = "/",
    tag = BOOK_TAG,
    params(BookQuery),
    responses(
        (status = 200, description = "Books matching the query", body = Vec<BookResponse>)
    )
)]
async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let filter = BookFilter::from(query);
    let books = state.services.books.list_books_with_details(&filter).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /api/books/{id} - Get one book
#[utoipa::path(
    get,
    path = "/{id}",
    tag = BOOK_TAG,
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookResponse>> {
    let book = state
        .services
        .books
        .get_book_with_details(id)
        .await?
        .ok_or_else(|| AppError::not_found("book", id))?;
    Ok(Json(book.into()))
}

/// POST /api/books - Create a book
///
/// The referenced author, category and publisher must exist.
#[utoipa::path(
    post,
    path = "/",
    tag = BOOK_TAG,
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Referenced author, category or publisher not found", body = ErrorResponse)
    )
)]
async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BookRequest>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let book = state.services.books.add_book(payload.into_new_book()).await?;
    let created = state
        .services
        .books
        .get_book_with_details(book.id)
        .await?
        .ok_or_else(|| AppError::not_found("book", book.id))?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /api/books/{id} - Replace a book
#[utoipa::path(
    put,
    path = "/{id}",
    tag = BOOK_TAG,
    params(("id" = i32, Path, description = "Book id")),
    request_body = BookRequest,
    responses(
        (status = 204, description = "Book updated"),
        (status = 400, description = "Id mismatch or invalid data", body = ErrorResponse),
        (status = 404, description = "Book or a referenced row not found", body = ErrorResponse)
    )
)]
async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<BookRequest>,
) -> AppResult<StatusCode> {
    ensure_same_id("Book", id, payload.id)?;
    state.services.books.update_book(payload.into_book()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/books/{id} - Delete a book and its reviews
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = BOOK_TAG,
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
async fn delete_book(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.books.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books/{id}/reviews - Reviews of one book
#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = BOOK_TAG,
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Reviews of the book", body = Vec<ReviewResponse>),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
async fn list_book_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ReviewResponse>>> {
    let reviews = state.services.reviews.get_reviews_by_book(id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// GET /api/books/{id}/rating - Average rating of one book
#[utoipa::path(
    get,
    path = "/{id}/rating",
    tag = BOOK_TAG,
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Average rating, 0 without reviews", body = RatingResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
async fn get_book_rating(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<RatingResponse>> {
    let average_rating = state.services.reviews.get_average_rating_for_book(id).await?;
    Ok(Json(RatingResponse {
        book_id: id,
        average_rating,
    }))
}
