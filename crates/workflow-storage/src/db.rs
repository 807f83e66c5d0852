use sqlx::PgPool;

use crate::error::StoreResult;

/// Shared handle to the Postgres pool. Cheap to clone: `sqlx::PgPool` is
/// itself a pooled handle behind an `Arc`.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(database_url))]
    pub async fn from_url(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| crate::error::StoreError::Database(e.into()))?;
        Ok(())
    }
}
