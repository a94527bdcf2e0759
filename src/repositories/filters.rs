//! Typed filters and the [`Entity`] bindings for every model.

use super::{Entity, Filter};
use crate::models::{
    Author, Book, Category, NewAuthor, NewBook, NewCategory, NewPublisher, NewReview, NewUser,
    Publisher, Review, User,
};

/// Case-insensitive substring match, the memory-side twin of `ILIKE '%needle%'`.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escapes `%`, `_` and `\` so user input is matched literally by `ILIKE`.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub title_contains: Option<String>,
}

impl BookFilter {
    pub fn by_author(author_id: i32) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn by_category(category_id: i32) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn by_publisher(publisher_id: i32) -> Self {
        Self {
            publisher_id: Some(publisher_id),
            ..Self::default()
        }
    }
}

impl Filter<Book> for BookFilter {
    fn matches(&self, book: &Book) -> bool {
        self.author_id.is_none_or(|id| book.author_id == id)
            && self.category_id.is_none_or(|id| book.category_id == id)
            && self.publisher_id.is_none_or(|id| book.publisher_id == id)
            && self
                .title_contains
                .as_deref()
                .is_none_or(|t| contains_ignore_case(&book.title, t))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub book_id: Option<i32>,
    pub min_rating: Option<i32>,
}

impl Filter<Review> for ReviewFilter {
    fn matches(&self, review: &Review) -> bool {
        self.book_id.is_none_or(|id| review.book_id == id)
            && self.min_rating.is_none_or(|min| review.rating >= min)
    }
}

/// Filter for entities that are identified by a display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    pub name_contains: Option<String>,
}

impl NameFilter {
    fn matches_name(&self, name: &str) -> bool {
        self.name_contains
            .as_deref()
            .is_none_or(|n| contains_ignore_case(name, n))
    }
}

impl Filter<Author> for NameFilter {
    fn matches(&self, author: &Author) -> bool {
        self.matches_name(&author.name)
    }
}

impl Filter<Category> for NameFilter {
    fn matches(&self, category: &Category) -> bool {
        self.matches_name(&category.name)
    }
}

impl Filter<Publisher> for NameFilter {
    fn matches(&self, publisher: &Publisher) -> bool {
        self.matches_name(&publisher.name)
    }
}

/// Lookups on the unique user columns. Username and email compare
/// case-insensitively; refresh tokens compare exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub email: Option<String>,
    pub username: Option<String>,
    pub refresh_token: Option<String>,
}

impl UserFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn by_refresh_token(token: impl Into<String>) -> Self {
        Self {
            refresh_token: Some(token.into()),
            ..Self::default()
        }
    }
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        self.email.as_deref().is_none_or(|e| same_identity(&user.email, e))
            && self
                .username
                .as_deref()
                .is_none_or(|u| same_identity(&user.username, u))
            && self
                .refresh_token
                .as_deref()
                .is_none_or(|t| user.refresh_token.as_deref() == Some(t))
    }
}

/// Username and email equality, matching the `lower(...)` unique indexes.
pub(crate) fn same_identity(stored: &str, candidate: &str) -> bool {
    stored.to_lowercase() == candidate.to_lowercase()
}

macro_rules! impl_entity {
    ($entity:ty, $new:ty, $filter:ty, $name:literal) => {
        impl Entity for $entity {
            type New = $new;
            type Filter = $filter;
            const NAME: &'static str = $name;

            fn id(&self) -> i32 {
                self.id
            }
        }
    };
}

impl_entity!(Book, NewBook, BookFilter, "book");
impl_entity!(Author, NewAuthor, NameFilter, "author");
impl_entity!(Category, NewCategory, NameFilter, "category");
impl_entity!(Publisher, NewPublisher, NameFilter, "publisher");
impl_entity!(Review, NewReview, ReviewFilter, "review");
impl_entity!(User, NewUser, UserFilter, "user");
