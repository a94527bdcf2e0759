//! Generic unit-of-work repository over the shared in-process tables.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::db::{MemoryDb, MemoryEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    Author, AuthorWithBooks, Book, BookDetails, Category, CategoryWithBooks, NewUser, Publisher,
    PublisherWithBooks, RefreshSession, Review, ReviewWithBook, Role, User,
};
use crate::repositories::changes::{ChangeSet, PendingChange};
use crate::repositories::{
    AuthorRepository, BookFilter, BookRepository, CategoryRepository, Entity, Filter,
    PublisherRepository, Repository, ReviewRepository, SaveSummary, UserRepository,
};

const INVALID_ROLE: &str = "Invalid role selected.";

pub(crate) struct MemoryRepository<E: Entity> {
    db: Arc<RwLock<MemoryDb>>,
    changes: ChangeSet<E>,
}

impl<E: Entity> MemoryRepository<E> {
    pub(crate) fn new(db: Arc<RwLock<MemoryDb>>) -> Self {
        Self {
            db,
            changes: ChangeSet::default(),
        }
    }
}

#[async_trait]
impl<E: MemoryEntity> Repository<E> for MemoryRepository<E> {
    async fn get_all(&self) -> AppResult<Vec<E>> {
        let db = self.db.read().await;
        Ok(E::table(&db).values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>> {
        let db = self.db.read().await;
        Ok(E::table(&db).get(id).cloned())
    }

    async fn find(&self, filter: &E::Filter) -> AppResult<Vec<E>> {
        let db = self.db.read().await;
        Ok(E::table(&db)
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    fn add(&mut self, new: E::New) {
        self.changes.push(PendingChange::Add(new));
    }

    fn update(&mut self, entity: E) {
        self.changes.push(PendingChange::Update(entity));
    }

    fn delete(&mut self, entity: E) {
        self.changes.push(PendingChange::Delete(entity));
    }

    async fn save_changes(&mut self) -> AppResult<SaveSummary<E>> {
        let pending = self.changes.take();
        if pending.is_empty() {
            return Ok(SaveSummary::default());
        }

        // Work on a copy and swap it in only when every change applied.
        let mut db = self.db.write().await;
        let mut draft = db.clone();
        let mut summary = SaveSummary::default();
        for change in pending {
            match change {
                PendingChange::Add(new) => summary.inserted.push(draft.insert::<E>(new)?),
                PendingChange::Update(entity) => {
                    draft.replace(entity)?;
                    summary.updated += 1;
                }
                PendingChange::Delete(entity) => {
                    draft.remove::<E>(entity.id())?;
                    summary.deleted += 1;
                }
            }
        }
        *db = draft;
        Ok(summary)
    }

    fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Inner join of books with their author, category and publisher.
fn book_details(db: &MemoryDb, filter: &BookFilter) -> Vec<BookDetails> {
    db.books
        .values()
        .filter(|book| filter.matches(book))
        .filter_map(|book| {
            Some(BookDetails {
                author: db.authors.get(book.author_id)?.clone(),
                category: db.categories.get(book.category_id)?.clone(),
                publisher: db.publishers.get(book.publisher_id)?.clone(),
                book: book.clone(),
            })
        })
        .collect()
}

#[async_trait]
impl BookRepository for MemoryRepository<Book> {
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>> {
        self.all_with_details(&BookFilter::by_author(author_id)).await
    }

    async fn books_by_category(&self, category_id: i32) -> AppResult<Vec<BookDetails>> {
        self.all_with_details(&BookFilter::by_category(category_id)).await
    }

    async fn books_by_publisher(&self, publisher_id: i32) -> AppResult<Vec<BookDetails>> {
        self.all_with_details(&BookFilter::by_publisher(publisher_id)).await
    }

    async fn book_with_details(&self, id: i32) -> AppResult<Option<BookDetails>> {
        let db = self.db.read().await;
        Ok(book_details(&db, &BookFilter::default())
            .into_iter()
            .find(|details| details.book.id == id))
    }

    async fn all_with_details(&self, filter: &BookFilter) -> AppResult<Vec<BookDetails>> {
        let db = self.db.read().await;
        Ok(book_details(&db, filter))
    }
}

#[async_trait]
impl AuthorRepository for MemoryRepository<Author> {
    async fn author_with_books(&self, id: i32) -> AppResult<Option<AuthorWithBooks>> {
        let db = self.db.read().await;
        Ok(db.authors.get(id).map(|author| AuthorWithBooks {
            author: author.clone(),
            books: book_details(&db, &BookFilter::by_author(id)),
        }))
    }
}

#[async_trait]
impl CategoryRepository for MemoryRepository<Category> {
    async fn category_with_books(&self, id: i32) -> AppResult<Option<CategoryWithBooks>> {
        let db = self.db.read().await;
        Ok(db.categories.get(id).map(|category| CategoryWithBooks {
            category: category.clone(),
            books: book_details(&db, &BookFilter::by_category(id)),
        }))
    }
}

#[async_trait]
impl PublisherRepository for MemoryRepository<Publisher> {
    async fn publisher_with_books(&self, id: i32) -> AppResult<Option<PublisherWithBooks>> {
        let db = self.db.read().await;
        Ok(db.publishers.get(id).map(|publisher| PublisherWithBooks {
            publisher: publisher.clone(),
            books: book_details(&db, &BookFilter::by_publisher(id)),
        }))
    }
}

fn with_title(db: &MemoryDb, review: &Review) -> Option<ReviewWithBook> {
    db.books.get(review.book_id).map(|book| ReviewWithBook {
        review: review.clone(),
        book_title: book.title.clone(),
    })
}

#[async_trait]
impl ReviewRepository for MemoryRepository<Review> {
    async fn reviews_by_book(&self, book_id: i32) -> AppResult<Vec<Review>> {
        let db = self.db.read().await;
        Ok(db
            .reviews
            .values()
            .filter(|review| review.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn average_rating_for_book(&self, book_id: i32) -> AppResult<f64> {
        let ratings = self.reviews_by_book(book_id).await?;
        if ratings.is_empty() {
            return Ok(0.0);
        }
        let total: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
        Ok(total as f64 / ratings.len() as f64)
    }

    async fn all_with_book_titles(&self) -> AppResult<Vec<ReviewWithBook>> {
        let db = self.db.read().await;
        Ok(db
            .reviews
            .values()
            .filter_map(|review| with_title(&db, review))
            .collect())
    }

    async fn review_with_book_title(&self, id: i32) -> AppResult<Option<ReviewWithBook>> {
        let db = self.db.read().await;
        Ok(db.reviews.get(id).and_then(|review| with_title(&db, review)))
    }
}

#[async_trait]
impl UserRepository for MemoryRepository<User> {
    async fn roles_for_user(&self, user_id: i32) -> AppResult<Vec<String>> {
        let db = self.db.read().await;
        let mut names: Vec<String> = db
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, role_id)| db.roles.get(*role_id).map(|r| r.name.clone()))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn role_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.db.read().await.role_id(name).is_some())
    }

    async fn ensure_role(&self, name: &str) -> AppResult<Role> {
        Ok(self.db.write().await.insert_role(name))
    }

    async fn assign_role(&self, user_id: i32, role: &str) -> AppResult<()> {
        let mut db = self.db.write().await;
        let role_id = db
            .role_id(role)
            .ok_or_else(|| AppError::bad_request(INVALID_ROLE))?;
        if !db.users.contains(user_id) {
            return Err(AppError::not_found(User::NAME, user_id));
        }
        db.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn register(
        &self,
        new_user: NewUser,
        role: &str,
        session: RefreshSession,
    ) -> AppResult<User> {
        let mut db = self.db.write().await;
        let role_id = db
            .role_id(role)
            .ok_or_else(|| AppError::bad_request(INVALID_ROLE))?;

        let mut draft = db.clone();
        let user = draft.insert::<User>(NewUser {
            refresh_token: Some(session.token),
            refresh_token_expiry_time: Some(session.expires_at),
            ..new_user
        })?;
        draft.user_roles.insert((user.id, role_id));
        *db = draft;
        Ok(user)
    }

    async fn set_refresh_session(&self, user_id: i32, session: &RefreshSession) -> AppResult<()> {
        let mut db = self.db.write().await;
        let user = db
            .users
            .rows
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(User::NAME, user_id))?;
        user.refresh_token = Some(session.token.clone());
        user.refresh_token_expiry_time = Some(session.expires_at);
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: i32,
        presented: &str,
        next: &RefreshSession,
    ) -> AppResult<bool> {
        let now = jiff::Timestamp::now();
        let mut db = self.db.write().await;
        let Some(user) = db.users.rows.get_mut(&user_id) else {
            return Ok(false);
        };
        let current = user.refresh_token.as_deref() == Some(presented)
            && user.refresh_token_expiry_time.is_some_and(|exp| exp > now);
        if !current {
            return Ok(false);
        }
        user.refresh_token = Some(next.token.clone());
        user.refresh_token_expiry_time = Some(next.expires_at);
        Ok(true)
    }

    async fn clear_refresh_token(&self, user_id: i32) -> AppResult<()> {
        let mut db = self.db.write().await;
        let user = db
            .users
            .rows
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(User::NAME, user_id))?;
        user.refresh_token = None;
        Ok(())
    }
}
