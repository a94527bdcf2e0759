//! Review request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewReview, Review, ReviewWithBook};

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewRequest {
    pub id: i32,
    #[validate(length(min = 1, max = 100, message = "Reviewer name is required and can't be longer than 100 characters."))]
    #[schema(example = "John Doe", max_length = 100)]
    pub reviewer_name: String,
    #[validate(length(min = 1, message = "Review content is required."))]
    #[schema(example = "Amazing book!")]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    #[validate(range(min = 1, message = "Book ID is required."))]
    pub book_id: i32,
}

impl ReviewRequest {
    pub fn into_new_review(self) -> NewReview {
        NewReview {
            reviewer_name: self.reviewer_name,
            content: self.content,
            rating: self.rating,
            book_id: self.book_id,
        }
    }

    pub fn into_review(self) -> Review {
        Review {
            id: self.id,
            reviewer_name: self.reviewer_name,
            content: self.content,
            rating: self.rating,
            book_id: self.book_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: i32,
    pub reviewer_name: String,
    pub content: String,
    pub rating: i32,
    pub book_id: i32,
    /// Omitted when the review is listed under its own book
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
}

impl From<ReviewWithBook> for ReviewResponse {
    fn from(ReviewWithBook { review, book_title }: ReviewWithBook) -> Self {
        Self {
            book_title: Some(book_title),
            ..Self::from(review)
        }
    }
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            reviewer_name: review.reviewer_name,
            content: review.content,
            rating: review.rating,
            book_id: review.book_id,
            book_title: None,
        }
    }
}
