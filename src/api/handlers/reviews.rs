//! Review request handlers.
//!
//! Reviews are listed with the title of their book.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::ensure_same_id;
use crate::api::doc::REVIEW_TAG;
use crate::api::dto::{ErrorResponse, ReviewRequest, ReviewResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

pub fn review_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_reviews, create_review))
        .routes(routes!(get_review, update_review, delete_review))
}

/// GET /api/reviews - List all reviews
#[utoipa::path(
    get,
    path = "/",
    tag = REVIEW_TAG,
    responses(
        (status = 200, description = "All reviews", body = Vec<ReviewResponse>)
    )
)]
async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<ReviewResponse>>> {
    let reviews = state.services.reviews.get_all_reviews().await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// GET /api/reviews/{id} - Get one review
#[utoipa::path(
    get,
    path = "/{id}",
    tag = REVIEW_TAG,
    params(("id" = i32, Path, description = "Review id")),
    responses(
        (status = 200, description = "The review", body = ReviewResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state
        .services
        .reviews
        .get_review_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("review", id))?;
    Ok(Json(review.into()))
}

/// POST /api/reviews - Create a review
///
/// The rating must be between 1 and 5 and the book must exist.
#[utoipa::path(
    post,
    path = "/",
    tag = REVIEW_TAG,
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
async fn create_review(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let review = state.services.reviews.add_review(payload.into_new_review()).await?;
    let response = match state.services.reviews.get_review_by_id(review.id).await? {
        Some(with_title) => ReviewResponse::from(with_title),
        None => ReviewResponse::from(review),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/reviews/{id} - Replace a review
#[utoipa::path(
    put,
    path = "/{id}",
    tag = REVIEW_TAG,
    params(("id" = i32, Path, description = "Review id")),
    request_body = ReviewRequest,
    responses(
        (status = 204, description = "Review updated"),
        (status = 400, description = "Id mismatch or invalid data", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> AppResult<StatusCode> {
    ensure_same_id("Review", id, payload.id)?;
    state.services.reviews.update_review(payload.into_review()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/reviews/{id} - Delete a review
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = REVIEW_TAG,
    params(("id" = i32, Path, description = "Review id")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
async fn delete_review(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.reviews.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
