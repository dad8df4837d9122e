use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Row, Sqlite, SqlitePool, sqlite::SqliteRow};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::decimal_column;

/// Attributes chosen for a cart line while disambiguating a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct SelectedAttributes {
    pub color: Option<String>,
    pub length: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: String,
    pub product_code: String,
    pub quantity: i64,
    pub selected_attrs: Option<String>, // JSON-serialized SelectedAttributes
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    pub fn parsed_attrs(&self) -> SelectedAttributes {
        self.selected_attrs
            .as_ref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default()
    }
}

/// Cart line joined with the catalog fields the cart view and checkout need.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CartItemWithProduct {
    #[serde(flatten)]
    #[ts(flatten)]
    pub item: CartItem,
    pub product_name: String,
    #[ts(type = "string")]
    pub price: Decimal,
    pub specification: Option<String>,
}

impl std::ops::Deref for CartItemWithProduct {
    type Target = CartItem;
    fn deref(&self) -> &Self::Target {
        &self.item
    }
}

impl<'r> FromRow<'r, SqliteRow> for CartItemWithProduct {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            item: CartItem::from_row(row)?,
            product_name: row.try_get("product_name")?,
            price: decimal_column(row, "price")?,
            specification: row.try_get("specification")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AddToCart {
    pub product_code: String,
    pub quantity: Option<i64>,
    pub attributes: Option<SelectedAttributes>,
}

impl CartItem {
    pub async fn find_by_user_with_product(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<CartItemWithProduct>, sqlx::Error> {
        sqlx::query_as::<_, CartItemWithProduct>(
            r#"SELECT c.id, c.user_id, c.product_code, c.quantity, c.selected_attrs,
                      c.created_at, c.updated_at,
                      p.name AS product_name, p.price, p.specification
               FROM cart_items c
               JOIN products p ON c.product_code = p.code
               WHERE c.user_id = $1
               ORDER BY c.created_at, c.rowid"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"SELECT id, user_id, product_code, quantity, selected_attrs, created_at, updated_at
               FROM cart_items
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user_and_product(
        pool: &SqlitePool,
        user_id: &str,
        product_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"SELECT id, user_id, product_code, quantity, selected_attrs, created_at, updated_at
               FROM cart_items
               WHERE user_id = $1 AND product_code = $2
               LIMIT 1"#,
        )
        .bind(user_id)
        .bind(product_code)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        user_id: &str,
        product_code: &str,
        quantity: i64,
        attrs: &SelectedAttributes,
    ) -> Result<Self, sqlx::Error> {
        let json = serde_json::to_string(attrs).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query_as::<_, CartItem>(
            r#"INSERT INTO cart_items (id, user_id, product_code, quantity, selected_attrs)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, user_id, product_code, quantity, selected_attrs, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(product_code)
        .bind(quantity)
        .bind(json)
        .fetch_one(pool)
        .await
    }

    pub async fn update_quantity(
        pool: &SqlitePool,
        id: Uuid,
        quantity: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"UPDATE cart_items
               SET quantity = $2,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, user_id, product_code, quantity, selected_attrs, created_at, updated_at"#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove every cart line of a user. Takes any executor so checkout can
    /// run it inside the order transaction.
    pub async fn delete_all_for_user<'e, E>(executor: E, user_id: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
