use crate::models;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{StoreRepo, sqlite_queries};

#[derive(Clone)]
pub struct SqlxSqliteRepo {
    pub db_pool: SqlitePool,
}

impl SqlxSqliteRepo {
    /// Creates the `store` table when the database is brand new
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(sqlite_queries::QUERY_CREATE_STORE_TABLE)
            .execute(&self.db_pool)
            .await
            .map(|_| ())
            .context("failed to create store table")
    }
}

#[async_trait]
impl StoreRepo for SqlxSqliteRepo {
    async fn get_store_by_id(
        &self,
        store_id: &str,
    ) -> anyhow::Result<Option<models::store::Store>> {
        Ok(
            sqlx::query_as::<_, models::store::Store>(sqlite_queries::QUERY_GET_STORE_BY_ID)
                .bind(store_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }
}
