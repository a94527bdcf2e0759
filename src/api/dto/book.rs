//! Book request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{Book, BookDetails, NewBook};
use crate::repositories::BookFilter;

/// Book payload for create and full-replace update.
///
/// `id` is ignored on create; on update it must equal the id in the URL.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct BookRequest {
    #[schema(example = 1)]
    pub id: i32,
    #[validate(length(min = 1, max = 100, message = "Title is required and can't be longer than 100 characters."))]
    #[schema(example = "The Hobbit", max_length = 100)]
    pub title: String,
    #[validate(length(min = 1, max = 20, message = "ISBN is required and can't be longer than 20 characters."))]
    #[schema(example = "978-0261103344", max_length = 20)]
    pub isbn: String,
    #[validate(range(min = 1, message = "Category is required."))]
    pub category_id: i32,
    #[validate(range(min = 1, message = "Author is required."))]
    pub author_id: i32,
    #[validate(range(min = 1, message = "Publisher is required."))]
    pub publisher_id: i32,
}

impl BookRequest {
    pub fn into_new_book(self) -> NewBook {
        NewBook {
            title: self.title,
            isbn: self.isbn,
            category_id: self.category_id,
            author_id: self.author_id,
            publisher_id: self.publisher_id,
        }
    }

    pub fn into_book(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            isbn: self.isbn,
            category_id: self.category_id,
            author_id: self.author_id,
            publisher_id: self.publisher_id,
        }
    }
}

/// A book flattened together with its author, category and publisher.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub category_id: i32,
    pub category_name: String,
    pub author_id: i32,
    pub author_name: String,
    pub publisher_id: i32,
    pub publisher_name: String,
    pub publisher_address: String,
    pub publisher_contact_number: String,
}

impl From<BookDetails> for BookResponse {
    fn from(details: BookDetails) -> Self {
        let BookDetails {
            book,
            author,
            category,
            publisher,
        } = details;
        Self {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            category_id: category.id,
            category_name: category.name,
            author_id: author.id,
            author_name: author.name,
            publisher_id: publisher.id,
            publisher_name: publisher.name,
            publisher_address: publisher.address,
            publisher_contact_number: publisher.contact_number,
        }
    }
}

/// Optional narrowing of `GET /api/books`. Absent parameters match everything.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub publisher_id: Option<i32>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        BookFilter {
            author_id: query.author_id,
            category_id: query.category_id,
            publisher_id: query.publisher_id,
            title_contains: query.title.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Average review rating of one book.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub book_id: i32,
    /// 0.0 when the book has no reviews
    #[schema(example = 4.5)]
    pub average_rating: f64,
}
