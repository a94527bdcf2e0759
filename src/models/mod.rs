//! Domain models and their diesel mappings.

mod author;
mod book;
mod category;
mod publisher;
mod review;
mod user;

pub use author::{Author, AuthorWithBooks, NewAuthor};
pub use book::{Book, BookDetails, NewBook};
pub use category::{Category, CategoryWithBooks, NewCategory};
pub use publisher::{NewPublisher, Publisher, PublisherWithBooks};
pub use review::{MAX_RATING, MIN_RATING, NewReview, Review, ReviewWithBook, is_valid_rating};
pub use user::{NewUser, RefreshSession, Role, User};
pub(crate) use user::{NewUserRole, NewUserRow, RefreshSessionChangeset, UserChangeset, UserRow};
