//! Category DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Category, NewCategory};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i32,
    #[validate(length(min = 1, max = 50, message = "Category name is required and can't be longer than 50 characters."))]
    #[schema(example = "Fantasy", max_length = 50)]
    pub name: String,
}

impl CategoryDto {
    pub fn into_new_category(self) -> NewCategory {
        NewCategory { name: self.name }
    }

    pub fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}
