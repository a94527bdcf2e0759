use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::MemoryRepository;
use super::db::MemoryDb;
use crate::error::AppResult;
use crate::models::{
    Author, Book, Category, NewAuthor, NewBook, NewCategory, NewPublisher, NewReview, Publisher,
    Review,
};
use crate::repositories::{
    AuthorRepository, BookRepository, CategoryRepository, PublisherRepository, ReviewRepository,
    Store, UserRepository,
};

/// Store backed by process memory. Data lives as long as the last clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
    db: Arc<RwLock<MemoryDb>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the same catalog rows the initial migration
    /// inserts.
    pub fn with_catalog_seed() -> AppResult<Self> {
        let mut db = MemoryDb::default();
        for name in ["J.K. Rowling", "Isaac Newton"] {
            db.insert::<Author>(NewAuthor {
                name: name.to_string(),
            })?;
        }
        for name in ["Fantasy", "Science"] {
            db.insert::<Category>(NewCategory {
                name: name.to_string(),
            })?;
        }
        for (name, address, contact) in [
            ("Bloomsbury", "London", "123456789"),
            ("Cambridge", "Cambridge", "987654321"),
        ] {
            db.insert::<Publisher>(NewPublisher {
                name: name.to_string(),
                address: address.to_string(),
                contact_number: contact.to_string(),
            })?;
        }
        for (title, isbn, id) in [
            ("Harry Potter and the Sorcerer's Stone", "123-456789", 1),
            ("Philosophiæ Naturalis Principia Mathematica", "987-654321", 2),
        ] {
            db.insert::<Book>(NewBook {
                title: title.to_string(),
                isbn: isbn.to_string(),
                category_id: id,
                author_id: id,
                publisher_id: id,
            })?;
        }
        for (reviewer, content, book_id) in [
            ("John Doe", "Amazing book!", 1),
            ("Jane Smith", "Very insightful.", 2),
        ] {
            db.insert::<Review>(NewReview {
                reviewer_name: reviewer.to_string(),
                content: content.to_string(),
                rating: 5,
                book_id,
            })?;
        }

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn books(&self) -> Box<dyn BookRepository> {
        Box::new(MemoryRepository::new(self.db.clone()))
    }

    fn authors(&self) -> Box<dyn AuthorRepository> {
        Box::new(MemoryRepository::new(self.db.clone()))
    }

    fn categories(&self) -> Box<dyn CategoryRepository> {
        Box::new(MemoryRepository::new(self.db.clone()))
    }

    fn publishers(&self) -> Box<dyn PublisherRepository> {
        Box::new(MemoryRepository::new(self.db.clone()))
    }

    fn reviews(&self) -> Box<dyn ReviewRepository> {
        Box::new(MemoryRepository::new(self.db.clone()))
    }

    fn users(&self) -> Box<dyn UserRepository> {
        Box::new(MemoryRepository::new(self.db.clone()))
    }

    async fn ping(&self) -> AppResult<()> {
        let _db = self.db.read().await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
