use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Book, MAX_RATING, MIN_RATING, NewReview, Review, ReviewWithBook, is_valid_rating};
use crate::repositories::Store;
use crate::services::persist::{delete_by_id, insert_one, require_exists, update_one};

/// Review operations.
///
/// Ratings are checked before any storage access; every operation scoped to a
/// book fails with `NotFound` when the book does not exist.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_reviews(&self) -> AppResult<Vec<ReviewWithBook>> {
        tracing::info!("Getting all reviews");
        self.store
            .reviews()
            .all_with_book_titles()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error retrieving all reviews"))
    }

    pub async fn get_review_by_id(&self, id: i32) -> AppResult<Option<ReviewWithBook>> {
        tracing::info!(review_id = id, "Getting review");
        let review = self
            .store
            .reviews()
            .review_with_book_title(id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, review_id = id, "Error retrieving review"))?;
        if review.is_none() {
            tracing::warn!(review_id = id, "Review was not found");
        }
        Ok(review)
    }

    pub async fn get_reviews_by_book(&self, book_id: i32) -> AppResult<Vec<Review>> {
        tracing::info!(book_id, "Getting reviews for book");
        let result = async {
            self.require_book(book_id).await?;
            self.store.reviews().reviews_by_book(book_id).await
        }
        .await;
        result.inspect_err(|e| tracing::error!(error = %e, book_id, "Error retrieving reviews for book"))
    }

    /// Mean rating of the book, `0.0` when it has no reviews yet.
    pub async fn get_average_rating_for_book(&self, book_id: i32) -> AppResult<f64> {
        tracing::info!(book_id, "Getting average rating for book");
        let result = async {
            self.require_book(book_id).await?;
            self.store.reviews().average_rating_for_book(book_id).await
        }
        .await;
        result.inspect_err(|e| tracing::error!(error = %e, book_id, "Error retrieving average rating"))
    }

    pub async fn add_review(&self, new_review: NewReview) -> AppResult<Review> {
        tracing::info!(book_id = new_review.book_id, "Adding new review");
        check_rating(new_review.rating)?;

        let result = async {
            self.require_book(new_review.book_id).await?;
            let review: Review = insert_one(self.store.reviews().as_mut(), new_review).await?;
            Ok(review)
        }
        .await;

        match &result {
            Ok(review) => tracing::info!(review_id = review.id, "Review added"),
            Err(e) => tracing::error!(error = %e, "Error adding review"),
        }
        result
    }

    pub async fn update_review(&self, review: Review) -> AppResult<()> {
        let id = review.id;
        tracing::info!(review_id = id, "Updating review");
        check_rating(review.rating)?;

        let result = async {
            let mut repo = self.store.reviews();
            require_exists::<Review, _>(repo.as_ref(), id).await?;
            self.require_book(review.book_id).await?;
            update_one(repo.as_mut(), review).await
        }
        .await;
        result.inspect_err(|e| tracing::error!(error = %e, review_id = id, "Error updating review"))
    }

    pub async fn delete_review(&self, id: i32) -> AppResult<()> {
        tracing::info!(review_id = id, "Deleting review");
        delete_by_id::<Review, _>(self.store.reviews().as_mut(), id)
            .await
            .inspect(|_| tracing::info!(review_id = id, "Review deleted"))
            .inspect_err(|e| tracing::error!(error = %e, review_id = id, "Error deleting review"))
    }

    async fn require_book(&self, book_id: i32) -> AppResult<()> {
        require_exists::<Book, _>(self.store.books().as_ref(), book_id)
            .await
            .inspect_err(|_| tracing::warn!(book_id, "Book was not found"))
    }
}

fn check_rating(rating: i32) -> AppResult<()> {
    if is_valid_rating(rating) {
        return Ok(());
    }
    tracing::warn!(rating, "Invalid rating value");
    Err(AppError::validation(
        "rating",
        format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
    ))
}
