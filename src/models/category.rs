use diesel::prelude::*;

use super::BookDetails;

/// Category row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithBooks {
    pub category: Category,
    pub books: Vec<BookDetails>,
}
