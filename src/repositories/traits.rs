//! Data-access contracts shared by every storage backend.

use async_trait::async_trait;

use super::BookFilter;
use crate::error::AppResult;
use crate::models::{
    Author, AuthorWithBooks, Book, BookDetails, Category, CategoryWithBooks, NewUser, Publisher,
    PublisherWithBooks, RefreshSession, Review, ReviewWithBook, Role, User,
};

/// A persisted record with a server-assigned integer identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Insert payload, without the identifier.
    type New: Clone + Send + Sync + 'static;
    /// Typed predicate accepted by [`Repository::find`].
    type Filter: Filter<Self>;
    /// Lowercase name used in error messages and logs.
    const NAME: &'static str;

    fn id(&self) -> i32;
}

/// Typed query predicate. The database backend translates it into SQL, the
/// memory backend evaluates [`Filter::matches`] row by row.
pub trait Filter<E>: Default + Clone + Send + Sync + 'static {
    fn matches(&self, entity: &E) -> bool;
}

/// Outcome of a successful [`Repository::save_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary<E> {
    /// Inserted rows with their assigned identifiers, in staging order.
    pub inserted: Vec<E>,
    pub updated: usize,
    pub deleted: usize,
}

impl<E> Default for SaveSummary<E> {
    fn default() -> Self {
        Self {
            inserted: Vec::new(),
            updated: 0,
            deleted: 0,
        }
    }
}

/// Generic unit-of-work repository.
///
/// `add`, `update` and `delete` only stage work. Nothing becomes visible to
/// other repositories until [`Repository::save_changes`] commits every staged
/// operation in a single transaction. A failed commit rolls back all of them
/// and leaves the staging buffer empty.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_all(&self) -> AppResult<Vec<E>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>>;

    async fn find(&self, filter: &E::Filter) -> AppResult<Vec<E>>;

    fn add(&mut self, new: E::New);

    fn update(&mut self, entity: E);

    fn delete(&mut self, entity: E);

    /// Commits staged operations in order.
    ///
    /// # Errors
    ///
    /// - `AppError::ConcurrencyConflict` if an updated or deleted row no longer exists
    /// - Constraint violations mapped by the database error converter
    async fn save_changes(&mut self) -> AppResult<SaveSummary<E>>;

    fn has_pending_changes(&self) -> bool;
}

#[async_trait]
pub trait BookRepository: Repository<Book> {
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>>;

    async fn books_by_category(&self, category_id: i32) -> AppResult<Vec<BookDetails>>;

    async fn books_by_publisher(&self, publisher_id: i32) -> AppResult<Vec<BookDetails>>;

    async fn book_with_details(&self, id: i32) -> AppResult<Option<BookDetails>>;

    /// Every book with author, category and publisher, optionally narrowed.
    async fn all_with_details(
        &self,
        filter: &BookFilter,
    ) -> AppResult<Vec<BookDetails>>;
}

#[async_trait]
pub trait AuthorRepository: Repository<Author> {
    async fn author_with_books(&self, id: i32) -> AppResult<Option<AuthorWithBooks>>;
}

#[async_trait]
pub trait CategoryRepository: Repository<Category> {
    async fn category_with_books(&self, id: i32) -> AppResult<Option<CategoryWithBooks>>;
}

#[async_trait]
pub trait PublisherRepository: Repository<Publisher> {
    async fn publisher_with_books(&self, id: i32) -> AppResult<Option<PublisherWithBooks>>;
}

#[async_trait]
pub trait ReviewRepository: Repository<Review> {
    async fn reviews_by_book(&self, book_id: i32) -> AppResult<Vec<Review>>;

    /// Mean rating of a book, `0.0` when it has no reviews.
    async fn average_rating_for_book(&self, book_id: i32) -> AppResult<f64>;

    async fn all_with_book_titles(&self) -> AppResult<Vec<ReviewWithBook>>;

    async fn review_with_book_title(&self, id: i32) -> AppResult<Option<ReviewWithBook>>;
}

/// Identity storage. Session operations write immediately instead of going
/// through the staging buffer, each in its own transaction.
#[async_trait]
pub trait UserRepository: Repository<User> {
    async fn roles_for_user(&self, user_id: i32) -> AppResult<Vec<String>>;

    async fn role_exists(&self, name: &str) -> AppResult<bool>;

    /// Creates the role when missing and returns it either way.
    async fn ensure_role(&self, name: &str) -> AppResult<Role>;

    async fn assign_role(&self, user_id: i32, role: &str) -> AppResult<()>;

    /// Inserts the user, its role assignment and its first refresh session
    /// atomically.
    ///
    /// # Errors
    ///
    /// - `AppError::BadRequest` if the role does not exist
    /// - `AppError::Duplicate` if the username or email is taken
    async fn register(
        &self,
        new_user: NewUser,
        role: &str,
        session: RefreshSession,
    ) -> AppResult<User>;

    /// Overwrites the stored refresh session unconditionally.
    async fn set_refresh_session(&self, user_id: i32, session: &RefreshSession) -> AppResult<()>;

    /// Replaces `presented` with `next` only if `presented` is still the
    /// stored, unexpired token. Returns `false` when the swap lost.
    async fn rotate_refresh_token(
        &self,
        user_id: i32,
        presented: &str,
        next: &RefreshSession,
    ) -> AppResult<bool>;

    /// # Errors
    ///
    /// `AppError::NotFound` if the user does not exist.
    async fn clear_refresh_token(&self, user_id: i32) -> AppResult<()>;
}

/// Hands out request-scoped repositories over shared storage.
///
/// Each call returns a repository with its own empty staging buffer.
#[async_trait]
pub trait Store: Send + Sync {
    fn books(&self) -> Box<dyn BookRepository>;

    fn authors(&self) -> Box<dyn AuthorRepository>;

    fn categories(&self) -> Box<dyn CategoryRepository>;

    fn publishers(&self) -> Box<dyn PublisherRepository>;

    fn reviews(&self) -> Box<dyn ReviewRepository>;

    fn users(&self) -> Box<dyn UserRepository>;

    /// Round trip to the backing storage, used by the health endpoint.
    async fn ping(&self) -> AppResult<()>;

    fn backend(&self) -> &'static str;
}
