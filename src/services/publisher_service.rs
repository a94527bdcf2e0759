use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewPublisher, Publisher, PublisherWithBooks};
use crate::repositories::Store;
use crate::services::persist::{delete_by_id, insert_one, require_exists, update_one};

#[derive(Clone)]
pub struct PublisherService {
    store: Arc<dyn Store>,
}

impl PublisherService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_publishers(&self) -> AppResult<Vec<Publisher>> {
        tracing::info!("Getting all publishers");
        self.store
            .publishers()
            .get_all()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error retrieving all publishers"))
    }

    pub async fn get_publisher_by_id(&self, id: i32) -> AppResult<Option<Publisher>> {
        tracing::info!(publisher_id = id, "Getting publisher");
        let publisher = self.store.publishers().get_by_id(id).await.inspect_err(|e| {
            tracing::error!(error = %e, publisher_id = id, "Error retrieving publisher")
        })?;
        if publisher.is_none() {
            tracing::warn!(publisher_id = id, "Publisher was not found");
        }
        Ok(publisher)
    }

    pub async fn get_publisher_with_books(&self, id: i32) -> AppResult<PublisherWithBooks> {
        tracing::info!(publisher_id = id, "Getting publisher with books");
        self.store
            .publishers()
            .publisher_with_books(id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, publisher_id = id, "Error retrieving publisher with books")
            })?
            .ok_or_else(|| AppError::not_found("publisher", id))
    }

    pub async fn add_publisher(&self, new_publisher: NewPublisher) -> AppResult<Publisher> {
        tracing::info!(name = %new_publisher.name, "Adding new publisher");
        let publisher: Publisher = insert_one(self.store.publishers().as_mut(), new_publisher)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error adding publisher"))?;
        tracing::info!(publisher_id = publisher.id, "Publisher added");
        Ok(publisher)
    }

    pub async fn update_publisher(&self, publisher: Publisher) -> AppResult<()> {
        let id = publisher.id;
        tracing::info!(publisher_id = id, "Updating publisher");
        let mut repo = self.store.publishers();
        let result = match require_exists::<Publisher, _>(repo.as_ref(), id).await {
            Ok(()) => update_one(repo.as_mut(), publisher).await,
            Err(e) => Err(e),
        };
        result.inspect_err(|e| {
            tracing::error!(error = %e, publisher_id = id, "Error updating publisher")
        })
    }

    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        tracing::info!(publisher_id = id, "Deleting publisher");
        delete_by_id::<Publisher, _>(self.store.publishers().as_mut(), id)
            .await
            .inspect(|_| tracing::info!(publisher_id = id, "Publisher deleted"))
            .inspect_err(|e| {
                tracing::error!(error = %e, publisher_id = id, "Error deleting publisher")
            })
    }
}
