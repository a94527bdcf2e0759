use diesel::prelude::*;

use super::{Author, Category, Publisher};

/// Book row. All three foreign keys are `ON DELETE RESTRICT`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = crate::schema::books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub category_id: i32,
    pub author_id: i32,
    pub publisher_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::books)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub category_id: i32,
    pub author_id: i32,
    pub publisher_id: i32,
}

/// A book with its author, category and publisher loaded eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub book: Book,
    pub author: Author,
    pub category: Category,
    pub publisher: Publisher,
}

impl From<(Book, Author, Category, Publisher)> for BookDetails {
    fn from((book, author, category, publisher): (Book, Author, Category, Publisher)) -> Self {
        Self {
            book,
            author,
            category,
            publisher,
        }
    }
}
