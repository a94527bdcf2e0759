//! Publisher DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewPublisher, Publisher};
use crate::utils::validate::PHONE_REGEX;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PublisherDto {
    pub id: i32,
    #[validate(length(min = 1, max = 100, message = "Publisher name is required and can't be longer than 100 characters."))]
    #[schema(example = "Allen & Unwin", max_length = 100)]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Publisher address is required and can't be longer than 200 characters."))]
    #[schema(example = "London", max_length = 200)]
    pub address: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number."))]
    #[schema(example = "+44123456789", pattern = r"^(\+\d{1,3})?(\d{6,15})$")]
    pub contact_number: String,
}

impl PublisherDto {
    pub fn into_new_publisher(self) -> NewPublisher {
        NewPublisher {
            name: self.name,
            address: self.address,
            contact_number: self.contact_number,
        }
    }

    pub fn into_publisher(self) -> Publisher {
        Publisher {
            id: self.id,
            name: self.name,
            address: self.address,
            contact_number: self.contact_number,
        }
    }
}

impl From<Publisher> for PublisherDto {
    fn from(publisher: Publisher) -> Self {
        Self {
            id: publisher.id,
            name: publisher.name,
            address: publisher.address,
            contact_number: publisher.contact_number,
        }
    }
}
