//! In-process tables that mirror the PostgreSQL schema, including its
//! foreign key, unique and check constraints.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AppError, AppResult};
use crate::models::{
    Author, Book, Category, NewAuthor, NewBook, NewCategory, NewPublisher, NewReview, NewUser,
    Publisher, Review, Role, User, is_valid_rating,
};
use crate::repositories::Entity;
use crate::repositories::filters::same_identity;

/// Rows keyed by id with a `SERIAL`-like counter. Ids are never reused.
#[derive(Debug, Clone)]
pub(crate) struct Table<T> {
    pub rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    pub fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: i32) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryDb {
    pub books: Table<Book>,
    pub authors: Table<Author>,
    pub categories: Table<Category>,
    pub publishers: Table<Publisher>,
    pub reviews: Table<Review>,
    pub users: Table<User>,
    pub roles: Table<Role>,
    /// `(user_id, role_id)` pairs.
    pub user_roles: BTreeSet<(i32, i32)>,
}

impl MemoryDb {
    pub fn role_id(&self, name: &str) -> Option<i32> {
        self.roles.values().find(|r| r.name == name).map(|r| r.id)
    }

    pub fn insert_role(&mut self, name: &str) -> Role {
        if let Some(role) = self.roles.values().find(|r| r.name == name) {
            return role.clone();
        }
        let role = Role {
            id: self.roles.next_id(),
            name: name.to_string(),
        };
        self.roles.rows.insert(role.id, role.clone());
        role
    }

    /// Inserts a row through the same checks a staged `add` goes through.
    pub fn insert<E: MemoryEntity>(&mut self, new: E::New) -> AppResult<E> {
        let id = E::table_mut(self).next_id();
        let entity = E::build(id, new);
        E::check_references(self, &entity)?;
        E::check_unique(self, &entity)?;
        E::table_mut(self).rows.insert(id, entity.clone());
        Ok(entity)
    }

    pub fn replace<E: MemoryEntity>(&mut self, entity: E) -> AppResult<()> {
        let id = entity.id();
        if !E::table(self).contains(id) {
            return Err(AppError::ConcurrencyConflict {
                entity: E::NAME.to_string(),
                id,
            });
        }
        E::check_references(self, &entity)?;
        E::check_unique(self, &entity)?;
        E::table_mut(self).rows.insert(id, entity);
        Ok(())
    }

    pub fn remove<E: MemoryEntity>(&mut self, id: i32) -> AppResult<()> {
        if !E::table(self).contains(id) {
            return Err(AppError::ConcurrencyConflict {
                entity: E::NAME.to_string(),
                id,
            });
        }
        E::remove_dependents(self, id)?;
        E::table_mut(self).rows.remove(&id);
        Ok(())
    }
}

/// Table access and constraint emulation for the memory backend.
///
/// Violations produce the same `AppError` shapes the database error
/// converter derives from PostgreSQL errors.
pub(crate) trait MemoryEntity: Entity {
    const TABLE: &'static str;

    fn table(db: &MemoryDb) -> &Table<Self>;

    fn table_mut(db: &mut MemoryDb) -> &mut Table<Self>;

    fn build(id: i32, new: Self::New) -> Self;

    fn check_references(_db: &MemoryDb, _entity: &Self) -> AppResult<()> {
        Ok(())
    }

    fn check_unique(_db: &MemoryDb, _entity: &Self) -> AppResult<()> {
        Ok(())
    }

    /// Enforces `ON DELETE RESTRICT` and applies `ON DELETE CASCADE`.
    fn remove_dependents(_db: &mut MemoryDb, _id: i32) -> AppResult<()> {
        Ok(())
    }
}

fn invalid_reference(field: &str, value: i32) -> AppError {
    AppError::validation(
        field,
        format!("Invalid reference in {} with value '{}'", field, value),
    )
}

fn still_referenced(table: &str, dependents: &str) -> AppError {
    AppError::validation("id", format!("{} is still referenced by {}", table, dependents))
}

impl MemoryEntity for Book {
    const TABLE: &'static str = "books";

    fn table(db: &MemoryDb) -> &Table<Self> {
        &db.books
    }

    fn table_mut(db: &mut MemoryDb) -> &mut Table<Self> {
        &mut db.books
    }

    fn build(id: i32, new: NewBook) -> Self {
        Book {
            id,
            title: new.title,
            isbn: new.isbn,
            category_id: new.category_id,
            author_id: new.author_id,
            publisher_id: new.publisher_id,
        }
    }

    fn check_references(db: &MemoryDb, book: &Self) -> AppResult<()> {
        if !db.categories.contains(book.category_id) {
            return Err(invalid_reference("category_id", book.category_id));
        }
        if !db.authors.contains(book.author_id) {
            return Err(invalid_reference("author_id", book.author_id));
        }
        if !db.publishers.contains(book.publisher_id) {
            return Err(invalid_reference("publisher_id", book.publisher_id));
        }
        Ok(())
    }

    fn remove_dependents(db: &mut MemoryDb, id: i32) -> AppResult<()> {
        db.reviews.rows.retain(|_, review| review.book_id != id);
        Ok(())
    }
}

/// Owners of books: deletion is restricted while any book points at them.
macro_rules! book_owner_entity {
    ($entity:ty, $new:ty, $field:ident, $table:literal, |$n:ident, $id:ident| $build:expr) => {
        impl MemoryEntity for $entity {
            const TABLE: &'static str = $table;

            fn table(db: &MemoryDb) -> &Table<Self> {
                &db.$field
            }

            fn table_mut(db: &mut MemoryDb) -> &mut Table<Self> {
                &mut db.$field
            }

            fn build($id: i32, $n: $new) -> Self {
                $build
            }

            fn remove_dependents(db: &mut MemoryDb, id: i32) -> AppResult<()> {
                if db.books.values().any(|book| Self::owns(book, id)) {
                    return Err(still_referenced($table, <Book as MemoryEntity>::TABLE));
                }
                Ok(())
            }
        }
    };
}

trait BookOwner {
    fn owns(book: &Book, id: i32) -> bool;
}

impl BookOwner for Author {
    fn owns(book: &Book, id: i32) -> bool {
        book.author_id == id
    }
}

impl BookOwner for Category {
    fn owns(book: &Book, id: i32) -> bool {
        book.category_id == id
    }
}

impl BookOwner for Publisher {
    fn owns(book: &Book, id: i32) -> bool {
        book.publisher_id == id
    }
}

book_owner_entity!(Author, NewAuthor, authors, "authors", |new, id| Author {
    id,
    name: new.name
});
book_owner_entity!(Category, NewCategory, categories, "categories", |new, id| {
    Category { id, name: new.name }
});
book_owner_entity!(Publisher, NewPublisher, publishers, "publishers", |new, id| {
    Publisher {
        id,
        name: new.name,
        address: new.address,
        contact_number: new.contact_number,
    }
});

impl MemoryEntity for Review {
    const TABLE: &'static str = "reviews";

    fn table(db: &MemoryDb) -> &Table<Self> {
        &db.reviews
    }

    fn table_mut(db: &mut MemoryDb) -> &mut Table<Self> {
        &mut db.reviews
    }

    fn build(id: i32, new: NewReview) -> Self {
        Review {
            id,
            reviewer_name: new.reviewer_name,
            content: new.content,
            rating: new.rating,
            book_id: new.book_id,
        }
    }

    fn check_references(db: &MemoryDb, review: &Self) -> AppResult<()> {
        if !is_valid_rating(review.rating) {
            return Err(AppError::validation(
                "rating",
                format!("Check constraint failed for {}", Self::TABLE),
            ));
        }
        if !db.books.contains(review.book_id) {
            return Err(invalid_reference("book_id", review.book_id));
        }
        Ok(())
    }
}

impl MemoryEntity for User {
    const TABLE: &'static str = "users";

    fn table(db: &MemoryDb) -> &Table<Self> {
        &db.users
    }

    fn table_mut(db: &mut MemoryDb) -> &mut Table<Self> {
        &mut db.users
    }

    fn build(id: i32, new: NewUser) -> Self {
        User {
            id,
            username: new.username,
            email: new.email,
            full_name: new.full_name,
            password_hash: new.password_hash,
            refresh_token: new.refresh_token,
            refresh_token_expiry_time: new.refresh_token_expiry_time,
            created_at: jiff::Timestamp::now(),
        }
    }

    fn check_unique(db: &MemoryDb, user: &Self) -> AppResult<()> {
        for other in db.users.values().filter(|u| u.id != user.id) {
            if same_identity(&other.username, &user.username) {
                return Err(duplicate("username", &user.username));
            }
            if same_identity(&other.email, &user.email) {
                return Err(duplicate("email", &user.email));
            }
        }
        Ok(())
    }

    fn remove_dependents(db: &mut MemoryDb, id: i32) -> AppResult<()> {
        db.user_roles.retain(|(user_id, _)| *user_id != id);
        Ok(())
    }
}

fn duplicate(field: &str, value: &str) -> AppError {
    AppError::Duplicate {
        entity: User::TABLE.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    }
}
