use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Row, Sqlite, SqlitePool, Type, sqlite::SqliteRow};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::decimal_column;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

/// Order header. Immutable once committed apart from `status`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Order {
    pub id: Uuid,
    pub order_no: String,
    pub user_id: String,
    pub address_id: Uuid,
    pub dealer_id: Uuid,
    #[ts(type = "string")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Order {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_no: row.try_get("order_no")?,
            user_id: row.try_get("user_id")?,
            address_id: row.try_get("address_id")?,
            dealer_id: row.try_get("dealer_id")?,
            total_amount: decimal_column(row, "total_amount")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_no: String,
    pub product_code: String,
    pub quantity: i64,
    #[ts(type = "string")]
    pub unit_price: Decimal,
    pub selected_color: Option<String>,
    pub selected_length: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for OrderItem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_no: row.try_get("order_no")?,
            product_code: row.try_get("product_code")?,
            quantity: row.try_get("quantity")?,
            unit_price: decimal_column(row, "unit_price")?,
            selected_color: row.try_get("selected_color")?,
            selected_length: row.try_get("selected_length")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Order line joined with the product's display name
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderItemWithProduct {
    #[serde(flatten)]
    #[ts(flatten)]
    pub item: OrderItem,
    pub product_name: String,
}

impl<'r> FromRow<'r, SqliteRow> for OrderItemWithProduct {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            item: OrderItem::from_row(row)?,
            product_name: row.try_get("product_name")?,
        })
    }
}

/// Header row to insert; the order number and total are computed by the caller.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub id: Uuid,
    pub order_no: &'a str,
    pub user_id: &'a str,
    pub address_id: Uuid,
    pub dealer_id: Uuid,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem<'a> {
    pub id: Uuid,
    pub order_no: &'a str,
    pub product_code: &'a str,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub selected_color: Option<&'a str>,
    pub selected_length: Option<&'a str>,
}

const ORDER_COLUMNS: &str =
    "id, order_no, user_id, address_id, dealer_id, total_amount, status, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_no, product_code, quantity, unit_price, \
     selected_color, selected_length, created_at";

impl Order {
    pub async fn create<'e, E>(executor: E, data: &NewOrder<'_>) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Order>(&format!(
            r#"INSERT INTO orders (id, order_no, user_id, address_id, dealer_id, total_amount, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {ORDER_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(data.order_no)
        .bind(data.user_id)
        .bind(data.address_id)
        .bind(data.dealer_id)
        .bind(data.total_amount.to_string())
        .bind(OrderStatus::Pending)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_no(
        pool: &SqlitePool,
        order_no: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_no = $1"
        ))
        .bind(order_no)
        .fetch_optional(pool)
        .await
    }

    /// Newest first
    pub async fn find_by_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"SELECT {ORDER_COLUMNS}
               FROM orders
               WHERE user_id = $1
               ORDER BY created_at DESC, rowid DESC"#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
    }
}

impl OrderItem {
    pub async fn create<'e, E>(executor: E, data: &NewOrderItem<'_>) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, OrderItem>(&format!(
            r#"INSERT INTO order_items (id, order_no, product_code, quantity, unit_price,
                                        selected_color, selected_length)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {ORDER_ITEM_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(data.order_no)
        .bind(data.product_code)
        .bind(data.quantity)
        .bind(data.unit_price.to_string())
        .bind(data.selected_color)
        .bind(data.selected_length)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_no_with_product(
        pool: &SqlitePool,
        order_no: &str,
    ) -> Result<Vec<OrderItemWithProduct>, sqlx::Error> {
        sqlx::query_as::<_, OrderItemWithProduct>(
            r#"SELECT oi.id, oi.order_no, oi.product_code, oi.quantity, oi.unit_price,
                      oi.selected_color, oi.selected_length, oi.created_at,
                      p.name AS product_name
               FROM order_items oi
               JOIN products p ON oi.product_code = p.code
               WHERE oi.order_no = $1
               ORDER BY oi.rowid"#,
        )
        .bind(order_no)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_items")
            .fetch_one(pool)
            .await
    }
}
