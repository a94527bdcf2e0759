//! Service layer for business logic operations.
//!
//! Services hold the shared [`Store`] and ask it for fresh repositories on
//! every call, so each operation has its own staging buffer.

mod auth_service;
mod author_service;
mod book_service;
mod category_service;
mod persist;
mod publisher_service;
mod review_service;
pub mod seed;
mod token_service;

#[cfg(test)]
mod tests;

pub use auth_service::{
    AuthService, DEFAULT_ROLE, INVALID_CREDENTIALS, INVALID_REFRESH_TOKEN, INVALID_ROLE,
    Registration, TokenPair, UNKNOWN_USER,
};
pub use author_service::AuthorService;
pub use book_service::BookService;
pub use category_service::CategoryService;
pub use publisher_service::PublisherService;
pub use review_service::ReviewService;
pub use token_service::TokenService;

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::repositories::Store;

/// Aggregates all services for use as Axum application state.
///
/// Cloning is cheap; every service only holds `Arc`s.
#[derive(Clone)]
pub struct Services {
    pub books: BookService,
    pub authors: AuthorService,
    pub categories: CategoryService,
    pub publishers: PublisherService,
    pub reviews: ReviewService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, jwt: JwtConfig) -> Self {
        let tokens = TokenService::new(jwt);
        Self {
            books: BookService::new(store.clone()),
            authors: AuthorService::new(store.clone()),
            categories: CategoryService::new(store.clone()),
            publishers: PublisherService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            auth: AuthService::new(store, tokens),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        self.auth.tokens()
    }
}
