//! Author DTOs. The same shape is used for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Author, NewAuthor};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i32,
    #[validate(length(min = 1, max = 100, message = "Author name is required and can't be longer than 100 characters."))]
    #[schema(example = "J.R.R. Tolkien", max_length = 100)]
    pub name: String,
}

impl AuthorDto {
    pub fn into_new_author(self) -> NewAuthor {
        NewAuthor { name: self.name }
    }

    pub fn into_author(self) -> Author {
        Author {
            id: self.id,
            name: self.name,
        }
    }
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
        }
    }
}
