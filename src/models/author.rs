use diesel::prelude::*;

use super::BookDetails;

/// Author row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = crate::schema::authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Author {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::authors)]
pub struct NewAuthor {
    pub name: String,
}

/// An author together with every book they wrote, each fully populated.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorWithBooks {
    pub author: Author,
    pub books: Vec<BookDetails>,
}
