//! Catalog lookup used by the dialog engine.

use async_trait::async_trait;
use db::models::product::{AttributeSet, Product};
use sqlx::SqlitePool;

/// Exact-match catalog search: every populated attribute of `filter` must be
/// equal on the returned products. Results keep store order, capped at `limit`.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn find(&self, filter: &AttributeSet, limit: i64) -> Result<Vec<Product>, sqlx::Error>;
}

/// Catalog backed by the `products` table
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogLookup for SqliteCatalog {
    async fn find(&self, filter: &AttributeSet, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
        Product::search(&self.pool, filter, limit).await
    }
}
