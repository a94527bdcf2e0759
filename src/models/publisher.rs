use diesel::prelude::*;

use super::BookDetails;

/// Publisher row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = crate::schema::publishers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub contact_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::publishers)]
pub struct NewPublisher {
    pub name: String,
    pub address: String,
    pub contact_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublisherWithBooks {
    pub publisher: Publisher,
    pub books: Vec<BookDetails>,
}
