//! Libris: a library catalog REST API.
//!
//! Books, authors, categories, publishers and reviews are exposed as JSON
//! resources under `/api`, with JWT-based registration, login, token refresh
//! and logout under `/api/auth`. Storage sits behind the [`repositories::Store`]
//! trait, backed by PostgreSQL or by process memory.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
