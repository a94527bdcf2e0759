//! In-process backend used by tests and `serve --in-memory`.
//!
//! Emulates the PostgreSQL constraints (foreign keys with restrict and
//! cascade rules, unique users, the rating check) so both backends fail the
//! same way.

mod db;
mod repository;
mod store;

pub(crate) use repository::MemoryRepository;
pub use store::MemoryStore;
