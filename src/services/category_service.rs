use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Category, CategoryWithBooks, NewCategory};
use crate::repositories::Store;
use crate::services::persist::{delete_by_id, insert_one, require_exists, update_one};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn Store>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_categories(&self) -> AppResult<Vec<Category>> {
        tracing::info!("Getting all categories");
        self.store
            .categories()
            .get_all()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error retrieving all categories"))
    }

    pub async fn get_category_by_id(&self, id: i32) -> AppResult<Option<Category>> {
        tracing::info!(category_id = id, "Getting category");
        let category = self.store.categories().get_by_id(id).await.inspect_err(|e| {
            tracing::error!(error = %e, category_id = id, "Error retrieving category")
        })?;
        if category.is_none() {
            tracing::warn!(category_id = id, "Category was not found");
        }
        Ok(category)
    }

    pub async fn get_category_with_books(&self, id: i32) -> AppResult<CategoryWithBooks> {
        tracing::info!(category_id = id, "Getting category with books");
        match self.store.categories().category_with_books(id).await {
            Ok(Some(category)) => Ok(category),
            Ok(None) => {
                tracing::warn!(category_id = id, "Category was not found");
                Err(AppError::not_found("category", id))
            }
            Err(e) => {
                tracing::error!(error = %e, category_id = id, "Error retrieving category with books");
                Err(e)
            }
        }
    }

    pub async fn add_category(&self, new_category: NewCategory) -> AppResult<Category> {
        tracing::info!(name = %new_category.name, "Adding new category");
        let category: Category = insert_one(self.store.categories().as_mut(), new_category)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error adding category"))?;
        tracing::info!(category_id = category.id, "Category added");
        Ok(category)
    }

    pub async fn update_category(&self, category: Category) -> AppResult<()> {
        let id = category.id;
        tracing::info!(category_id = id, "Updating category");
        let mut repo = self.store.categories();
        let result = match require_exists::<Category, _>(repo.as_ref(), id).await {
            Ok(()) => update_one(repo.as_mut(), category).await,
            Err(e) => Err(e),
        };
        result.inspect_err(|e| {
            tracing::error!(error = %e, category_id = id, "Error updating category")
        })
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        tracing::info!(category_id = id, "Deleting category");
        delete_by_id::<Category, _>(self.store.categories().as_mut(), id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, category_id = id, "Error deleting category")
            })
    }
}
