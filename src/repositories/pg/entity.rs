//! Per-table diesel queries behind the generic PostgreSQL repository.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::sql_types::Text;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{
    Author, Book, Category, NewUser, NewUserRow, Publisher, Review, User, UserChangeset, UserRow,
};
use crate::repositories::filters::like_pattern;
use crate::repositories::{BookFilter, Entity, NameFilter, ReviewFilter, UserFilter};
use crate::schema::users;

diesel::define_sql_function!(fn lower(value: Text) -> Text);

/// Row-level operations an entity needs for [`super::PgRepository`].
///
/// `update_row` and `delete_row` report the affected row count so the
/// repository can detect rows that disappeared before commit.
#[async_trait]
pub(crate) trait PgEntity: Entity {
    async fn load_all(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Self>>;

    async fn load_by_id(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Self>>;

    async fn load_filtered(
        conn: &mut AsyncPgConnection,
        filter: &Self::Filter,
    ) -> QueryResult<Vec<Self>>;

    async fn insert(conn: &mut AsyncPgConnection, new: Self::New) -> QueryResult<Self>;

    async fn update_row(conn: &mut AsyncPgConnection, entity: &Self) -> QueryResult<usize>;

    async fn delete_row(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize>;
}

/// Implements [`PgEntity`] for catalog tables whose insert payload and row
/// type derive the diesel traits directly.
macro_rules! catalog_pg_entity {
    ($entity:ty, $table:ident, |$filter:ident, $query:ident| $apply:block) => {
        #[async_trait]
        impl PgEntity for $entity {
            async fn load_all(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Self>> {
                use crate::schema::$table::dsl;
                dsl::$table
                    .order(dsl::id.asc())
                    .select(<$entity>::as_select())
                    .load(conn)
                    .await
            }

            async fn load_by_id(
                conn: &mut AsyncPgConnection,
                id: i32,
            ) -> QueryResult<Option<Self>> {
                use crate::schema::$table::dsl;
                dsl::$table
                    .find(id)
                    .select(<$entity>::as_select())
                    .first(conn)
                    .await
                    .optional()
            }

            async fn load_filtered(
                conn: &mut AsyncPgConnection,
                $filter: &Self::Filter,
            ) -> QueryResult<Vec<Self>> {
                use crate::schema::$table::dsl;
                #[allow(unused_mut)]
                let mut $query = dsl::$table
                    .order(dsl::id.asc())
                    .select(<$entity>::as_select())
                    .into_boxed();
                $apply;
                $query.load(conn).await
            }

            async fn insert(conn: &mut AsyncPgConnection, new: Self::New) -> QueryResult<Self> {
                use crate::schema::$table::dsl;
                diesel::insert_into(dsl::$table)
                    .values(&new)
                    .returning(<$entity>::as_returning())
                    .get_result(conn)
                    .await
            }

            async fn update_row(conn: &mut AsyncPgConnection, entity: &Self) -> QueryResult<usize> {
                use crate::schema::$table::dsl;
                diesel::update(dsl::$table.find(entity.id))
                    .set(entity)
                    .execute(conn)
                    .await
            }

            async fn delete_row(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
                use crate::schema::$table::dsl;
                diesel::delete(dsl::$table.find(id)).execute(conn).await
            }
        }
    };
}

catalog_pg_entity!(Book, books, |filter, query| {
    let BookFilter {
        author_id,
        category_id,
        publisher_id,
        title_contains,
    } = filter;
    if let Some(author_id) = author_id {
        query = query.filter(dsl::author_id.eq(*author_id));
    }
    if let Some(category_id) = category_id {
        query = query.filter(dsl::category_id.eq(*category_id));
    }
    if let Some(publisher_id) = publisher_id {
        query = query.filter(dsl::publisher_id.eq(*publisher_id));
    }
    if let Some(title) = title_contains {
        query = query.filter(dsl::title.ilike(like_pattern(title)));
    }
});

catalog_pg_entity!(Author, authors, |filter, query| {
    let NameFilter { name_contains } = filter;
    if let Some(name) = name_contains {
        query = query.filter(dsl::name.ilike(like_pattern(name)));
    }
});

catalog_pg_entity!(Category, categories, |filter, query| {
    let NameFilter { name_contains } = filter;
    if let Some(name) = name_contains {
        query = query.filter(dsl::name.ilike(like_pattern(name)));
    }
});

catalog_pg_entity!(Publisher, publishers, |filter, query| {
    let NameFilter { name_contains } = filter;
    if let Some(name) = name_contains {
        query = query.filter(dsl::name.ilike(like_pattern(name)));
    }
});

catalog_pg_entity!(Review, reviews, |filter, query| {
    let ReviewFilter {
        book_id,
        min_rating,
    } = filter;
    if let Some(book_id) = book_id {
        query = query.filter(dsl::book_id.eq(*book_id));
    }
    if let Some(min_rating) = min_rating {
        query = query.filter(dsl::rating.ge(*min_rating));
    }
});

// Users store timestamps through jiff-diesel wrappers, so they map through
// dedicated row types instead of the macro above.
#[async_trait]
impl PgEntity for User {
    async fn load_all(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Self>> {
        use crate::schema::users::dsl;
        let rows = dsl::users
            .order(dsl::id.asc())
            .select(UserRow::as_select())
            .load(conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn load_by_id(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Self>> {
        use crate::schema::users::dsl;
        let row = dsl::users
            .find(id)
            .select(UserRow::as_select())
            .first(conn)
            .await
            .optional()?;
        Ok(row.map(User::from))
    }

    async fn load_filtered(
        conn: &mut AsyncPgConnection,
        filter: &UserFilter,
    ) -> QueryResult<Vec<Self>> {
        let rows = filtered_users(filter)
            .select(UserRow::as_select())
            .load(conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn insert(conn: &mut AsyncPgConnection, new: NewUser) -> QueryResult<Self> {
        use crate::schema::users::dsl;
        let row = diesel::insert_into(dsl::users)
            .values(NewUserRow::from(new))
            .returning(UserRow::as_returning())
            .get_result(conn)
            .await?;
        Ok(User::from(row))
    }

    async fn update_row(conn: &mut AsyncPgConnection, user: &Self) -> QueryResult<usize> {
        use crate::schema::users::dsl;
        diesel::update(dsl::users.find(user.id))
            .set(UserChangeset::from(user))
            .execute(conn)
            .await
    }

    async fn delete_row(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
        use crate::schema::users::dsl;
        diesel::delete(dsl::users.find(id)).execute(conn).await
    }
}

/// Username and email go through `lower(...)` on both sides so lookups hit
/// the case-insensitive unique indexes.
fn filtered_users(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    use crate::schema::users::dsl;
    let mut query = dsl::users.order(dsl::id.asc()).into_boxed();
    if let Some(email) = &filter.email {
        query = query.filter(lower(dsl::email).eq(lower(email.clone())));
    }
    if let Some(username) = &filter.username {
        query = query.filter(lower(dsl::username).eq(lower(username.clone())));
    }
    if let Some(token) = &filter.refresh_token {
        query = query.filter(dsl::refresh_token.eq(token.clone()));
    }
    query
}
