use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Author, AuthorWithBooks, NewAuthor};
use crate::repositories::Store;
use crate::services::persist::{delete_by_id, insert_one, require_exists, update_one};

#[derive(Clone)]
pub struct AuthorService {
    store: Arc<dyn Store>,
}

impl AuthorService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_authors(&self) -> AppResult<Vec<Author>> {
        tracing::info!("Getting all authors");
        self.store
            .authors()
            .get_all()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error retrieving all authors"))
    }

    pub async fn get_author_by_id(&self, id: i32) -> AppResult<Option<Author>> {
        tracing::info!(author_id = id, "Getting author");
        let author = self
            .store
            .authors()
            .get_by_id(id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, author_id = id, "Error retrieving author"))?;
        if author.is_none() {
            tracing::warn!(author_id = id, "Author was not found");
        }
        Ok(author)
    }

    /// The author and every book written by them.
    ///
    /// # Errors
    ///
    /// `AppError::NotFound` when the author does not exist.
    pub async fn get_author_with_books(&self, id: i32) -> AppResult<AuthorWithBooks> {
        tracing::info!(author_id = id, "Getting author with books");
        self.store
            .authors()
            .author_with_books(id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, author_id = id, "Error retrieving author with books")
            })?
            .ok_or_else(|| {
                tracing::warn!(author_id = id, "Author was not found");
                AppError::not_found("author", id)
            })
    }

    pub async fn add_author(&self, new_author: NewAuthor) -> AppResult<Author> {
        tracing::info!(name = %new_author.name, "Adding new author");
        let author: Author = insert_one(self.store.authors().as_mut(), new_author)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error adding author"))?;
        tracing::info!(author_id = author.id, "Author added");
        Ok(author)
    }

    pub async fn update_author(&self, author: Author) -> AppResult<()> {
        let id = author.id;
        tracing::info!(author_id = id, "Updating author");
        let mut repo = self.store.authors();
        let result = match require_exists::<Author, _>(repo.as_ref(), id).await {
            Ok(()) => update_one(repo.as_mut(), author).await,
            Err(e) => Err(e),
        };
        result
            .inspect(|_| tracing::info!(author_id = id, "Author updated"))
            .inspect_err(|e| tracing::error!(error = %e, author_id = id, "Error updating author"))
    }

    /// # Errors
    ///
    /// - `AppError::NotFound` when the author does not exist
    /// - `AppError::Validation` while books still reference the author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        tracing::info!(author_id = id, "Deleting author");
        delete_by_id::<Author, _>(self.store.authors().as_mut(), id)
            .await
            .inspect(|_| tracing::info!(author_id = id, "Author deleted"))
            .inspect_err(|e| tracing::error!(error = %e, author_id = id, "Error deleting author"))
    }
}
