use diesel::prelude::*;

/// Lowest accepted rating, inclusive.
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating, inclusive.
pub const MAX_RATING: i32 = 5;

/// Review row. Removed together with its book.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, AsChangeset)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Review {
    pub id: i32,
    pub reviewer_name: String,
    pub content: String,
    pub rating: i32,
    pub book_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::reviews)]
pub struct NewReview {
    pub reviewer_name: String,
    pub content: String,
    pub rating: i32,
    pub book_id: i32,
}

/// A review paired with the title of the book it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewWithBook {
    pub review: Review,
    pub book_title: String,
}

pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
