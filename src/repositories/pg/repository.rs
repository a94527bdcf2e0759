//! Generic unit-of-work repository over a bb8 pool of async PostgreSQL
//! connections, plus the entity-specific extensions.

use async_trait::async_trait;
use diesel::dsl::{count, exists, now, sum};
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use super::entity::PgEntity;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{
    Author, AuthorWithBooks, Book, BookDetails, Category, CategoryWithBooks, NewUser,
    NewUserRole, NewUserRow, Publisher, PublisherWithBooks, RefreshSession,
    RefreshSessionChangeset, Review, ReviewWithBook, Role, User, UserRow,
};
use crate::repositories::changes::{ChangeSet, PendingChange};
use crate::repositories::filters::like_pattern;
use crate::repositories::{
    AuthorRepository, BookFilter, BookRepository, CategoryRepository, Entity, PublisherRepository,
    Repository, ReviewFilter, ReviewRepository, SaveSummary, UserRepository,
};
use crate::schema::{authors, books, categories, publishers, reviews, roles, user_roles, users};

const INVALID_ROLE: &str = "Invalid role selected.";

/// Request-scoped repository. Only the pool is shared; the staging buffer
/// belongs to this instance.
pub(crate) struct PgRepository<E: Entity> {
    pool: AsyncDbPool,
    changes: ChangeSet<E>,
}

impl<E: Entity> PgRepository<E> {
    pub(crate) fn new(pool: AsyncDbPool) -> Self {
        Self {
            pool,
            changes: ChangeSet::default(),
        }
    }

    fn db_error(operation: &str) -> impl Fn(diesel::result::Error) -> AppError + '_ {
        move |e| DatabaseErrorConverter::convert_diesel_error(e, operation)
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgRepository<E> {
    async fn get_all(&self) -> AppResult<Vec<E>> {
        let mut conn = self.pool.get().await?;
        E::load_all(&mut conn)
            .await
            .map_err(Self::db_error(&format!("list {}", E::NAME)))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>> {
        let mut conn = self.pool.get().await?;
        E::load_by_id(&mut conn, id)
            .await
            .map_err(Self::db_error(&format!("find {}", E::NAME)))
    }

    async fn find(&self, filter: &E::Filter) -> AppResult<Vec<E>> {
        let mut conn = self.pool.get().await?;
        E::load_filtered(&mut conn, filter)
            .await
            .map_err(Self::db_error(&format!("filter {}", E::NAME)))
    }

    fn add(&mut self, new: E::New) {
        self.changes.push(PendingChange::Add(new));
    }

    fn update(&mut self, entity: E) {
        self.changes.push(PendingChange::Update(entity));
    }

    fn delete(&mut self, entity: E) {
        self.changes.push(PendingChange::Delete(entity));
    }

    async fn save_changes(&mut self) -> AppResult<SaveSummary<E>> {
        let pending = self.changes.take();
        if pending.is_empty() {
            return Ok(SaveSummary::default());
        }

        let operation = format!("save {} changes", E::NAME);
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let mut summary = SaveSummary::default();
                for change in pending {
                    match change {
                        PendingChange::Add(new) => {
                            let inserted = E::insert(conn, new)
                                .await
                                .map_err(Self::db_error(&operation))?;
                            summary.inserted.push(inserted);
                        }
                        PendingChange::Update(entity) => {
                            let affected = E::update_row(conn, &entity)
                                .await
                                .map_err(Self::db_error(&operation))?;
                            if affected == 0 {
                                return Err(conflict::<E>(entity.id()));
                            }
                            summary.updated += affected;
                        }
                        PendingChange::Delete(entity) => {
                            let affected = E::delete_row(conn, entity.id())
                                .await
                                .map_err(Self::db_error(&operation))?;
                            if affected == 0 {
                                return Err(conflict::<E>(entity.id()));
                            }
                            summary.deleted += affected;
                        }
                    }
                }
                Ok(summary)
            }
            .scope_boxed()
        })
        .await
    }

    fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

fn conflict<E: Entity>(id: i32) -> AppError {
    AppError::ConcurrencyConflict {
        entity: E::NAME.to_string(),
        id,
    }
}

/// Loads books joined with author, category and publisher in one query.
async fn load_book_details(
    conn: &mut AsyncPgConnection,
    book_id: Option<i32>,
    filter: &BookFilter,
) -> QueryResult<Vec<BookDetails>> {
    let mut query = books::table
        .inner_join(authors::table)
        .inner_join(categories::table)
        .inner_join(publishers::table)
        .order(books::id.asc())
        .select((
            Book::as_select(),
            Author::as_select(),
            Category::as_select(),
            Publisher::as_select(),
        ))
        .into_boxed();

    if let Some(id) = book_id {
        query = query.filter(books::id.eq(id));
    }
    if let Some(id) = filter.author_id {
        query = query.filter(books::author_id.eq(id));
    }
    if let Some(id) = filter.category_id {
        query = query.filter(books::category_id.eq(id));
    }
    if let Some(id) = filter.publisher_id {
        query = query.filter(books::publisher_id.eq(id));
    }
    if let Some(title) = &filter.title_contains {
        query = query.filter(books::title.ilike(like_pattern(title)));
    }

    let rows: Vec<(Book, Author, Category, Publisher)> = query.load(conn).await?;
    Ok(rows.into_iter().map(BookDetails::from).collect())
}

#[async_trait]
impl BookRepository for PgRepository<Book> {
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookDetails>> {
        self.all_with_details(&BookFilter::by_author(author_id)).await
    }

    async fn books_by_category(&self, category_id: i32) -> AppResult<Vec<BookDetails>> {
        self.all_with_details(&BookFilter::by_category(category_id)).await
    }

    async fn books_by_publisher(&self, publisher_id: i32) -> AppResult<Vec<BookDetails>> {
        self.all_with_details(&BookFilter::by_publisher(publisher_id)).await
    }

    async fn book_with_details(&self, id: i32) -> AppResult<Option<BookDetails>> {
        let mut conn = self.pool.get().await?;
        let mut rows = load_book_details(&mut conn, Some(id), &BookFilter::default())
            .await
            .map_err(Self::db_error("load book details"))?;
        Ok(rows.pop())
    }

    async fn all_with_details(&self, filter: &BookFilter) -> AppResult<Vec<BookDetails>> {
        let mut conn = self.pool.get().await?;
        load_book_details(&mut conn, None, filter)
            .await
            .map_err(Self::db_error("load book details"))
    }
}

/// Implements a `*_with_books` extension: the owner row, then its books
/// with their details.
macro_rules! with_books_repository {
    ($trait:ident, $method:ident, $entity:ty, $graph:ident, $field:ident, $filter:expr) => {
        #[async_trait]
        impl $trait for PgRepository<$entity> {
            async fn $method(&self, id: i32) -> AppResult<Option<$graph>> {
                let mut conn = self.pool.get().await?;
                let operation = concat!("load ", stringify!($field), " with books");
                let Some(owner) = <$entity as PgEntity>::load_by_id(&mut conn, id)
                    .await
                    .map_err(Self::db_error(operation))?
                else {
                    return Ok(None);
                };
                let books = load_book_details(&mut conn, None, &$filter(id))
                    .await
                    .map_err(Self::db_error(operation))?;
                Ok(Some($graph {
                    $field: owner,
                    books,
                }))
            }
        }
    };
}

with_books_repository!(
    AuthorRepository,
    author_with_books,
    Author,
    AuthorWithBooks,
    author,
    BookFilter::by_author
);
with_books_repository!(
    CategoryRepository,
    category_with_books,
    Category,
    CategoryWithBooks,
    category,
    BookFilter::by_category
);
with_books_repository!(
    PublisherRepository,
    publisher_with_books,
    Publisher,
    PublisherWithBooks,
    publisher,
    BookFilter::by_publisher
);

#[async_trait]
impl ReviewRepository for PgRepository<Review> {
    async fn reviews_by_book(&self, book_id: i32) -> AppResult<Vec<Review>> {
        self.find(&ReviewFilter {
            book_id: Some(book_id),
            min_rating: None,
        })
        .await
    }

    async fn average_rating_for_book(&self, book_id: i32) -> AppResult<f64> {
        let mut conn = self.pool.get().await?;
        let (total, reviews): (Option<i64>, i64) = reviews::table
            .filter(reviews::book_id.eq(book_id))
            .select((sum(reviews::rating), count(reviews::id)))
            .first(&mut conn)
            .await
            .map_err(Self::db_error("average rating"))?;

        Ok(match (total, reviews) {
            (Some(total), n) if n > 0 => total as f64 / n as f64,
            _ => 0.0,
        })
    }

    async fn all_with_book_titles(&self) -> AppResult<Vec<ReviewWithBook>> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<(Review, String)> = reviews::table
            .inner_join(books::table)
            .order(reviews::id.asc())
            .select((Review::as_select(), books::title))
            .load(&mut conn)
            .await
            .map_err(Self::db_error("list reviews"))?;
        Ok(rows
            .into_iter()
            .map(|(review, book_title)| ReviewWithBook { review, book_title })
            .collect())
    }

    async fn review_with_book_title(&self, id: i32) -> AppResult<Option<ReviewWithBook>> {
        let mut conn = self.pool.get().await?;
        let row: Option<(Review, String)> = reviews::table
            .inner_join(books::table)
            .filter(reviews::id.eq(id))
            .select((Review::as_select(), books::title))
            .first(&mut conn)
            .await
            .optional()
            .map_err(Self::db_error("find review"))?;
        Ok(row.map(|(review, book_title)| ReviewWithBook { review, book_title }))
    }
}

async fn find_role_id(conn: &mut AsyncPgConnection, name: &str) -> QueryResult<Option<i32>> {
    roles::table
        .filter(roles::name.eq(name))
        .select(roles::id)
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl UserRepository for PgRepository<User> {
    async fn roles_for_user(&self, user_id: i32) -> AppResult<Vec<String>> {
        let mut conn = self.pool.get().await?;
        user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq(user_id))
            .order(roles::name.asc())
            .select(roles::name)
            .load(&mut conn)
            .await
            .map_err(Self::db_error("load user roles"))
    }

    async fn role_exists(&self, name: &str) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;
        diesel::select(exists(roles::table.filter(roles::name.eq(name))))
            .get_result(&mut conn)
            .await
            .map_err(Self::db_error("check role"))
    }

    async fn ensure_role(&self, name: &str) -> AppResult<Role> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(roles::table)
            .values(roles::name.eq(name))
            .on_conflict(roles::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(Self::db_error("ensure role"))?;
        roles::table
            .filter(roles::name.eq(name))
            .select(Role::as_select())
            .first(&mut conn)
            .await
            .map_err(Self::db_error("ensure role"))
    }

    async fn assign_role(&self, user_id: i32, role: &str) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let role_id = find_role_id(&mut conn, role)
            .await
            .map_err(Self::db_error("assign role"))?
            .ok_or_else(|| AppError::bad_request(INVALID_ROLE))?;
        diesel::insert_into(user_roles::table)
            .values(NewUserRole { user_id, role_id })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(Self::db_error("assign role"))?;
        Ok(())
    }

    async fn register(
        &self,
        new_user: NewUser,
        role: &str,
        session: RefreshSession,
    ) -> AppResult<User> {
        let mut conn = self.pool.get().await?;
        let role = role.to_string();
        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let role_id = find_role_id(conn, &role)
                    .await
                    .map_err(Self::db_error("register user"))?
                    .ok_or_else(|| AppError::bad_request(INVALID_ROLE))?;

                let row = NewUserRow::from(NewUser {
                    refresh_token: Some(session.token),
                    refresh_token_expiry_time: Some(session.expires_at),
                    ..new_user
                });
                let user: User = diesel::insert_into(users::table)
                    .values(row)
                    .returning(UserRow::as_returning())
                    .get_result::<UserRow>(conn)
                    .await
                    .map_err(Self::db_error("register user"))?
                    .into();

                diesel::insert_into(user_roles::table)
                    .values(NewUserRole {
                        user_id: user.id,
                        role_id,
                    })
                    .execute(conn)
                    .await
                    .map_err(Self::db_error("register user"))?;
                Ok(user)
            }
            .scope_boxed()
        })
        .await
    }

    async fn set_refresh_session(&self, user_id: i32, session: &RefreshSession) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let affected = diesel::update(users::table.find(user_id))
            .set(RefreshSessionChangeset::from(session))
            .execute(&mut conn)
            .await
            .map_err(Self::db_error("store refresh token"))?;
        if affected == 0 {
            return Err(AppError::not_found(User::NAME, user_id));
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: i32,
        presented: &str,
        next: &RefreshSession,
    ) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;
        let affected = diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::refresh_token.eq(presented))
                .filter(users::refresh_token_expiry_time.gt(now)),
        )
        .set(RefreshSessionChangeset::from(next))
        .execute(&mut conn)
        .await
        .map_err(Self::db_error("rotate refresh token"))?;
        Ok(affected == 1)
    }

    async fn clear_refresh_token(&self, user_id: i32) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let affected = diesel::update(users::table.find(user_id))
            .set(users::refresh_token.eq(None::<String>))
            .execute(&mut conn)
            .await
            .map_err(Self::db_error("clear refresh token"))?;
        if affected == 0 {
            return Err(AppError::not_found(User::NAME, user_id));
        }
        Ok(())
    }
}
