//! PostgreSQL backend built on diesel-async and bb8.

mod entity;
mod repository;
mod store;

pub(crate) use repository::PgRepository;
pub use store::PgStore;
