//! Shopping cart. One line per (user, product); re-adding a product merges
//! into the existing line.

use db::models::{
    cart::{AddToCart, CartItem, CartItemWithProduct},
    product::Product,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("cart item not found")]
    NotFound,
    #[error("invalid cart request: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCartItem {
    pub quantity: i64,
}

fn check_quantity(quantity: i64) -> Result<i64, CartError> {
    if quantity < 1 {
        return Err(CartError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(quantity)
}

pub struct CartService;

impl CartService {
    pub async fn list(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<CartItemWithProduct>, CartError> {
        Ok(CartItem::find_by_user_with_product(pool, user_id).await?)
    }

    /// Add a product. If the user already has a line for it, the quantity is
    /// added to that line and the selected attributes are kept from the
    /// first add.
    pub async fn add(
        pool: &SqlitePool,
        user_id: &str,
        payload: &AddToCart,
    ) -> Result<CartItem, CartError> {
        let quantity = check_quantity(payload.quantity.unwrap_or(1))?;

        if Product::find_by_code(pool, &payload.product_code)
            .await?
            .is_none()
        {
            return Err(CartError::ProductNotFound(payload.product_code.clone()));
        }

        if let Some(existing) =
            CartItem::find_by_user_and_product(pool, user_id, &payload.product_code).await?
        {
            let merged = existing.quantity.checked_add(quantity).ok_or_else(|| {
                CartError::Validation("quantity out of range".to_string())
            })?;
            let item = CartItem::update_quantity(pool, existing.id, merged).await?;
            info!(
                user_id = %user_id,
                product_code = %payload.product_code,
                quantity = merged,
                "Merged cart line"
            );
            return Ok(item);
        }

        let item = CartItem::create(
            pool,
            Uuid::new_v4(),
            user_id,
            &payload.product_code,
            quantity,
            &payload.attributes.clone().unwrap_or_default(),
        )
        .await?;
        info!(
            user_id = %user_id,
            product_code = %payload.product_code,
            quantity,
            "Added cart line"
        );
        Ok(item)
    }

    pub async fn update_quantity(
        pool: &SqlitePool,
        user_id: &str,
        item_id: Uuid,
        quantity: i64,
    ) -> Result<CartItem, CartError> {
        let quantity = check_quantity(quantity)?;
        Self::owned_item(pool, user_id, item_id).await?;
        Ok(CartItem::update_quantity(pool, item_id, quantity).await?)
    }

    pub async fn remove_item(
        pool: &SqlitePool,
        user_id: &str,
        item_id: Uuid,
    ) -> Result<(), CartError> {
        Self::owned_item(pool, user_id, item_id).await?;
        CartItem::delete(pool, item_id).await?;
        Ok(())
    }

    /// Returns the number of lines removed
    pub async fn clear(pool: &SqlitePool, user_id: &str) -> Result<u64, CartError> {
        let removed = CartItem::delete_all_for_user(pool, user_id).await?;
        info!(user_id = %user_id, removed, "Cleared cart");
        Ok(removed)
    }

    /// Lines of other users are reported as not found.
    async fn owned_item(
        pool: &SqlitePool,
        user_id: &str,
        item_id: Uuid,
    ) -> Result<CartItem, CartError> {
        CartItem::find_by_id(pool, item_id)
            .await?
            .filter(|item| item.user_id == user_id)
            .ok_or(CartError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use db::{
        DBService,
        models::{cart::SelectedAttributes, product::CreateProduct},
    };
    use rust_decimal::Decimal;

    use super::*;

    async fn setup() -> DBService {
        let db = DBService::new_in_memory().await.unwrap();
        Product::create(
            &db.pool,
            &CreateProduct {
                code: "PIPE-001".to_string(),
                name: "联塑 PVC-U给水管 dn110".to_string(),
                specification: Some("dn110".to_string()),
                price: Decimal::from_str("158.00").unwrap(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        db
    }

    fn add(quantity: Option<i64>) -> AddToCart {
        AddToCart {
            product_code: "PIPE-001".to_string(),
            quantity,
            attributes: Some(SelectedAttributes {
                color: Some("白色".to_string()),
                length: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_add_merges_into_existing_line() {
        let db = setup().await;

        let first = CartService::add(&db.pool, "u1", &add(None)).await.unwrap();
        assert_eq!(first.quantity, 1);
        let merged = CartService::add(&db.pool, "u1", &add(Some(3))).await.unwrap();
        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 4);

        let lines = CartService::list(&db.pool, "u1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "联塑 PVC-U给水管 dn110");
        assert_eq!(lines[0].parsed_attrs().color.as_deref(), Some("白色"));
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_product_and_bad_quantity() {
        let db = setup().await;

        let mut payload = add(Some(1));
        payload.product_code = "NOPE".to_string();
        assert!(matches!(
            CartService::add(&db.pool, "u1", &payload).await,
            Err(CartError::ProductNotFound(_))
        ));
        assert!(matches!(
            CartService::add(&db.pool, "u1", &add(Some(0))).await,
            Err(CartError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_merge_past_quantity_range_is_rejected() {
        let db = setup().await;
        let item = CartService::add(&db.pool, "u1", &add(Some(1))).await.unwrap();
        CartService::update_quantity(&db.pool, "u1", item.id, i64::MAX)
            .await
            .unwrap();

        assert!(matches!(
            CartService::add(&db.pool, "u1", &add(Some(1))).await,
            Err(CartError::Validation(_))
        ));
        let lines = CartService::list(&db.pool, "u1").await.unwrap();
        assert_eq!(lines[0].quantity, i64::MAX);
    }

    #[tokio::test]
    async fn test_update_and_remove_are_scoped_to_owner() {
        let db = setup().await;
        let item = CartService::add(&db.pool, "u1", &add(Some(2))).await.unwrap();

        assert!(matches!(
            CartService::update_quantity(&db.pool, "u2", item.id, 5).await,
            Err(CartError::NotFound)
        ));
        let updated = CartService::update_quantity(&db.pool, "u1", item.id, 5)
            .await
            .unwrap();
        assert_eq!(updated.quantity, 5);

        assert!(matches!(
            CartService::remove_item(&db.pool, "u2", item.id).await,
            Err(CartError::NotFound)
        ));
        CartService::remove_item(&db.pool, "u1", item.id).await.unwrap();
        assert!(CartService::list(&db.pool, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let db = setup().await;
        CartService::add(&db.pool, "u1", &add(Some(2))).await.unwrap();
        CartService::add(&db.pool, "u2", &add(Some(2))).await.unwrap();

        assert_eq!(CartService::clear(&db.pool, "u1").await.unwrap(), 1);
        assert_eq!(CartItem::count_for_user(&db.pool, "u2").await.unwrap(), 1);
    }
}
