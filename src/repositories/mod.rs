//! Repository layer for data access operations.
//!
//! [`Repository`] is the generic unit-of-work contract; the per-entity
//! extension traits add eager-loading and session queries. A [`Store`] hands
//! out request-scoped repositories for one of two backends:
//! [`PgStore`] (PostgreSQL) or [`MemoryStore`] (process memory).

mod changes;
mod filters;
mod memory;
mod pg;
mod traits;

pub use filters::{BookFilter, NameFilter, ReviewFilter, UserFilter};
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use traits::{
    AuthorRepository, BookRepository, CategoryRepository, Entity, Filter, PublisherRepository,
    Repository, ReviewRepository, SaveSummary, Store, UserRepository,
};
