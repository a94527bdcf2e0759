use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Author, Book, BookDetails, Category, NewBook, Publisher};
use crate::repositories::{BookFilter, Store};
use crate::services::persist::{delete_by_id, insert_one, require_exists, update_one};

/// Book catalog operations.
///
/// Writes check that the referenced author, category and publisher exist so
/// the caller gets `NotFound` instead of a constraint violation.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn Store>,
}

impl BookService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_books(&self) -> AppResult<Vec<Book>> {
        tracing::info!("Getting all books");
        self.store
            .books()
            .get_all()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error retrieving all books"))
    }

    /// Returns `None` for an unknown id; callers decide whether that is an error.
    pub async fn get_book_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        tracing::info!(book_id = id, "Getting book");
        let book = self
            .store
            .books()
            .get_by_id(id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, book_id = id, "Error retrieving book"))?;
        if book.is_none() {
            tracing::warn!(book_id = id, "Book was not found");
        }
        Ok(book)
    }

    pub async fn get_book_with_details(&self, id: i32) -> AppResult<Option<BookDetails>> {
        tracing::info!(book_id = id, "Getting book with details");
        let details = self
            .store
            .books()
            .book_with_details(id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, book_id = id, "Error retrieving book details")
            })?;
        if details.is_none() {
            tracing::warn!(book_id = id, "Book was not found");
        }
        Ok(details)
    }

    /// Lists books with their relations, narrowed by `filter`.
    pub async fn list_books_with_details(&self, filter: &BookFilter) -> AppResult<Vec<BookDetails>> {
        tracing::info!(?filter, "Listing books with details");
        self.store
            .books()
            .all_with_details(filter)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error listing books"))
    }

    pub async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>> {
        tracing::info!(author_id, "Getting books by author");
        self.store
            .books()
            .books_by_author(author_id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, author_id, "Error retrieving books by author"))
    }

    pub async fn books_by_category(&self, category_id: i32) -> AppResult<Vec<BookDetails>> {
        tracing::info!(category_id, "Getting books by category");
        self.store
            .books()
            .books_by_category(category_id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, category_id, "Error retrieving books by category")
            })
    }

    pub async fn books_by_publisher(&self, publisher_id: i32) -> AppResult<Vec<BookDetails>> {
        tracing::info!(publisher_id, "Getting books by publisher");
        self.store
            .books()
            .books_by_publisher(publisher_id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, publisher_id, "Error retrieving books by publisher")
            })
    }

    pub async fn add_book(&self, new_book: NewBook) -> AppResult<Book> {
        tracing::info!(title = %new_book.title, "Adding new book");
        let result = async {
            self.check_references(new_book.author_id, new_book.category_id, new_book.publisher_id)
                .await?;
            let book: Book = insert_one(self.store.books().as_mut(), new_book).await?;
            Ok(book)
        }
        .await;

        match &result {
            Ok(book) => tracing::info!(book_id = book.id, "Book added"),
            Err(e) => tracing::error!(error = %e, "Error adding book"),
        }
        result
    }

    pub async fn update_book(&self, book: Book) -> AppResult<()> {
        let id = book.id;
        tracing::info!(book_id = id, "Updating book");
        let result = async {
            let mut repo = self.store.books();
            require_exists::<Book, _>(repo.as_ref(), id).await?;
            self.check_references(book.author_id, book.category_id, book.publisher_id)
                .await?;
            update_one(repo.as_mut(), book).await
        }
        .await;

        match &result {
            Ok(()) => tracing::info!(book_id = id, "Book updated"),
            Err(e) => tracing::error!(error = %e, book_id = id, "Error updating book"),
        }
        result
    }

    /// Deleting a book also removes its reviews.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        tracing::info!(book_id = id, "Deleting book");
        delete_by_id::<Book, _>(self.store.books().as_mut(), id)
            .await
            .inspect(|_| tracing::info!(book_id = id, "Book deleted"))
            .inspect_err(|e| match e {
                AppError::NotFound { .. } => {
                    tracing::warn!(book_id = id, "Book not found for deletion")
                }
                _ => tracing::error!(error = %e, book_id = id, "Error deleting book"),
            })
    }

    async fn check_references(
        &self,
        author_id: i32,
        category_id: i32,
        publisher_id: i32,
    ) -> AppResult<()> {
        require_exists::<Author, _>(self.store.authors().as_ref(), author_id).await?;
        require_exists::<Category, _>(self.store.categories().as_ref(), category_id).await?;
        require_exists::<Publisher, _>(self.store.publishers().as_ref(), publisher_id).await
    }
}
