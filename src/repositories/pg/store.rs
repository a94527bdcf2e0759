use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use super::PgRepository;
use crate::db::AsyncDbPool;
use crate::error::{AppResult, DatabaseErrorConverter};
use crate::repositories::{
    AuthorRepository, BookRepository, CategoryRepository, PublisherRepository, ReviewRepository,
    Store, UserRepository,
};

/// PostgreSQL-backed store. Cloning shares the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: AsyncDbPool,
}

impl PgStore {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AsyncDbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn books(&self) -> Box<dyn BookRepository> {
        Box::new(PgRepository::new(self.pool.clone()))
    }

    fn authors(&self) -> Box<dyn AuthorRepository> {
        Box::new(PgRepository::new(self.pool.clone()))
    }

    fn categories(&self) -> Box<dyn CategoryRepository> {
        Box::new(PgRepository::new(self.pool.clone()))
    }

    fn publishers(&self) -> Box<dyn PublisherRepository> {
        Box::new(PgRepository::new(self.pool.clone()))
    }

    fn reviews(&self) -> Box<dyn ReviewRepository> {
        Box::new(PgRepository::new(self.pool.clone()))
    }

    fn users(&self) -> Box<dyn UserRepository> {
        Box::new(PgRepository::new(self.pool.clone()))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "ping database"))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
