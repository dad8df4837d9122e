//! Catalog browsing.

use db::models::product::Product;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("product not found: {0}")]
    NotFound(String),
}

pub struct ProductService;

impl ProductService {
    /// Catalog in store order; a missing or non-positive limit falls back to
    /// `DEFAULT_LIST_LIMIT`.
    pub async fn list(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<Product>, ProductError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIST_LIMIT);
        let products = Product::find_all(pool, limit).await?;
        debug!(count = products.len(), limit, "Listed products");
        Ok(products)
    }

    pub async fn get(pool: &SqlitePool, code: &str) -> Result<Product, ProductError> {
        Product::find_by_code(pool, code)
            .await?
            .ok_or_else(|| ProductError::NotFound(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use db::{DBService, models::product::CreateProduct};
    use rust_decimal::Decimal;

    use super::*;

    #[tokio::test]
    async fn test_list_and_get() {
        let db = DBService::new_in_memory().await.unwrap();
        for code in ["A", "B", "C"] {
            Product::create(
                &db.pool,
                &CreateProduct {
                    code: code.to_string(),
                    name: format!("item {code}"),
                    price: Decimal::from_str("2.50").unwrap(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(ProductService::list(&db.pool, None).await.unwrap().len(), 3);
        assert_eq!(ProductService::list(&db.pool, Some(2)).await.unwrap().len(), 2);
        assert_eq!(ProductService::list(&db.pool, Some(0)).await.unwrap().len(), 3);

        let product = ProductService::get(&db.pool, "B").await.unwrap();
        assert_eq!(product.name, "item B");
        assert!(matches!(
            ProductService::get(&db.pool, "Z").await,
            Err(ProductError::NotFound(code)) if code == "Z"
        ));
    }
}
