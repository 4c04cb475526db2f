pub mod sqlite;
pub mod sqlite_queries;

use crate::models;
use async_trait::async_trait;

/// Read-only access to store credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreRepo {
    async fn get_store_by_id(&self, store_id: &str) -> anyhow::Result<Option<models::store::Store>>;
}

pub type ImplStoreRepo = Box<dyn StoreRepo>;
