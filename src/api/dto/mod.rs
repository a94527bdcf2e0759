//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain. All bodies are camelCase on the wire.

mod auth;
mod author;
mod book;
mod category;
mod error;
mod health;
mod publisher;
mod review;

pub use auth::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse};
pub use author::AuthorDto;
pub use book::{BookQuery, BookRequest, BookResponse, RatingResponse};
pub use category::CategoryDto;
pub use error::{ErrorResponse, MessageResponse};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use publisher::PublisherDto;
pub use review::{ReviewRequest, ReviewResponse};
