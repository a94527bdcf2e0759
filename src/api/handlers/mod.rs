//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod health;
pub mod publishers;
pub mod reviews;

use crate::error::{AppError, AppResult};

/// PUT bodies repeat the id; a mismatch is rejected before any lookup.
fn ensure_same_id(entity: &str, path_id: i32, body_id: i32) -> AppResult<()> {
    if path_id != body_id {
        tracing::warn!(path_id, body_id, "{} id does not match the request body", entity);
        return Err(AppError::bad_request(format!(
            "{} id {} in the URL does not match id {} in the request body.",
            entity, path_id, body_id
        )));
    }
    Ok(())
}
