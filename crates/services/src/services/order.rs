//! Order placement and lookup.
//!
//! `create_order` writes the order header, its lines and clears the user's
//! cart in one transaction; either all three land or none do.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use db::{
    models::{
        address::Address,
        cart::CartItem,
        dealer::Dealer,
        order::{NewOrder, NewOrderItem, Order, OrderItem, OrderItemWithProduct},
    },
    money::to_currency,
};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use ts_rs::TS;
use uuid::Uuid;

pub const ORDER_NO_PREFIX: &str = "DD";
pub const ORDER_CREATED_MESSAGE: &str = "Order created";

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("order creation failed")]
    WriteFailed(#[source] sqlx::Error),
    #[error("order creation timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid order: {0}")]
    Validation(String),
    #[error("order not found")]
    NotFound,
}

/// One priced line of an order request
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderLine {
    pub product_code: String,
    pub quantity: i64,
    #[ts(type = "string")]
    pub unit_price: Decimal,
    pub selected_color: Option<String>,
    pub selected_length: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateOrder {
    pub user_id: String,
    pub address_id: Uuid,
    pub dealer_id: Uuid,
    pub items: Vec<OrderLine>,
}

/// Request body for checkout; the user comes from the route
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CheckoutRequest {
    pub address_id: Uuid,
    pub dealer_id: Uuid,
    /// Explicit lines; when absent the user's cart is checked out at catalog prices.
    pub items: Option<Vec<OrderLine>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderCreated {
    pub order_no: String,
    pub success: bool,
    pub message: String,
    #[ts(type = "string")]
    pub total_amount: Decimal,
}

/// Order header with its lines, dealer and delivery address
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub order: Order,
    pub dealer_name: Option<String>,
    pub dealer_phone: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub full_address: Option<String>,
    pub items: Vec<OrderItemWithProduct>,
}

/// `DD` + local date as `YYYYMMDD` + six zero-padded random digits. The
/// suffix is not checked against existing orders; a same-day collision fails
/// the insert on the UNIQUE `order_no` column.
pub fn generate_order_no<R: Rng>(date: NaiveDate, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..1_000_000);
    format!("{ORDER_NO_PREFIX}{}{suffix:06}", date.format("%Y%m%d"))
}

/// Sum of quantity × unit price at currency precision. Fails instead of
/// overflowing the decimal range.
pub fn total_amount(lines: &[OrderLine]) -> Result<Decimal, OrderError> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, line| {
            Decimal::from(line.quantity)
                .checked_mul(line.unit_price)
                .and_then(|subtotal| total.checked_add(subtotal))
        })
        .map(to_currency)
        .ok_or_else(|| OrderError::Validation("order total out of range".to_string()))
}

fn validate_lines(lines: &[OrderLine]) -> Result<(), OrderError> {
    if lines.is_empty() {
        return Err(OrderError::Validation("order has no items".to_string()));
    }

    for line in lines {
        if line.product_code.trim().is_empty() {
            return Err(OrderError::Validation("product code is required".to_string()));
        }
        if line.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "quantity for {} must be at least 1",
                line.product_code
            )));
        }
        if line.unit_price.is_sign_negative() {
            return Err(OrderError::Validation(format!(
                "unit price for {} must not be negative",
                line.product_code
            )));
        }
    }

    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    tx_timeout: Duration,
}

impl OrderService {
    pub fn new(pool: SqlitePool, tx_timeout: Duration) -> Self {
        Self { pool, tx_timeout }
    }

    /// Persist an order and its lines and empty the user's cart, atomically.
    /// On any failure nothing is written and the cart is left as it was.
    pub async fn create_order(&self, params: &CreateOrder) -> Result<OrderCreated, OrderError> {
        validate_lines(&params.items)?;

        let total = total_amount(&params.items)?;
        let order_no = generate_order_no(Local::now().date_naive(), &mut rand::thread_rng());

        match tokio::time::timeout(self.tx_timeout, self.write_order(&order_no, total, params))
            .await
        {
            Ok(Ok(())) => {
                info!(
                    order_no = %order_no,
                    user_id = %params.user_id,
                    items = params.items.len(),
                    total_amount = %total,
                    "Order created"
                );
                Ok(OrderCreated {
                    order_no,
                    success: true,
                    message: ORDER_CREATED_MESSAGE.to_string(),
                    total_amount: total,
                })
            }
            Ok(Err(e)) => {
                error!(
                    order_no = %order_no,
                    user_id = %params.user_id,
                    error = %e,
                    "Error creating order, rolled back"
                );
                Err(OrderError::WriteFailed(e))
            }
            // Dropping the in-flight transaction rolls it back.
            Err(_) => {
                error!(
                    order_no = %order_no,
                    user_id = %params.user_id,
                    timeout = ?self.tx_timeout,
                    "Order transaction timed out, rolled back"
                );
                Err(OrderError::Timeout(self.tx_timeout))
            }
        }
    }

    /// Check out the user's cart. Without explicit lines, every cart item is
    /// ordered at the product's current catalog price.
    pub async fn checkout_cart(
        &self,
        user_id: &str,
        request: CheckoutRequest,
    ) -> Result<OrderCreated, OrderError> {
        let items = match request.items {
            Some(items) => items,
            None => self.lines_from_cart(user_id).await?,
        };

        self.create_order(&CreateOrder {
            user_id: user_id.to_string(),
            address_id: request.address_id,
            dealer_id: request.dealer_id,
            items,
        })
        .await
    }

    async fn lines_from_cart(&self, user_id: &str) -> Result<Vec<OrderLine>, OrderError> {
        let cart = CartItem::find_by_user_with_product(&self.pool, user_id).await?;
        if cart.is_empty() {
            return Err(OrderError::Validation("cart is empty".to_string()));
        }

        Ok(cart
            .into_iter()
            .map(|entry| {
                let attrs = entry.parsed_attrs();
                OrderLine {
                    product_code: entry.item.product_code,
                    quantity: entry.item.quantity,
                    unit_price: entry.price,
                    selected_color: attrs.color,
                    selected_length: attrs.length,
                }
            })
            .collect())
    }

    async fn write_order(
        &self,
        order_no: &str,
        total: Decimal,
        params: &CreateOrder,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Err(e) = Self::insert_order_rows(&mut tx, order_no, total, params).await {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(order_no = %order_no, error = %rollback_err, "Rollback failed");
            }
            return Err(e);
        }

        tx.commit().await
    }

    async fn insert_order_rows(
        conn: &mut SqliteConnection,
        order_no: &str,
        total: Decimal,
        params: &CreateOrder,
    ) -> Result<(), sqlx::Error> {
        Order::create(
            &mut *conn,
            &NewOrder {
                id: Uuid::new_v4(),
                order_no,
                user_id: &params.user_id,
                address_id: params.address_id,
                dealer_id: params.dealer_id,
                total_amount: total,
            },
        )
        .await?;

        for line in &params.items {
            OrderItem::create(
                &mut *conn,
                &NewOrderItem {
                    id: Uuid::new_v4(),
                    order_no,
                    product_code: &line.product_code,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    selected_color: non_empty(&line.selected_color),
                    selected_length: non_empty(&line.selected_length),
                },
            )
            .await?;
        }

        let cleared = CartItem::delete_all_for_user(&mut *conn, &params.user_id).await?;
        debug!(order_no = %order_no, cleared, "Cleared cart for order");

        Ok(())
    }

    pub async fn list_orders(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        Ok(Order::find_by_user(&self.pool, user_id).await?)
    }

    /// Full order view. Orders of other users are reported as not found.
    pub async fn get_order_detail(
        &self,
        user_id: &str,
        order_no: &str,
    ) -> Result<OrderDetail, OrderError> {
        let order = Order::find_by_order_no(&self.pool, order_no)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or(OrderError::NotFound)?;

        let dealer = Dealer::find_by_id(&self.pool, order.dealer_id).await?;
        let address = Address::find_by_id(&self.pool, order.address_id).await?;
        let items = OrderItem::find_by_order_no_with_product(&self.pool, order_no).await?;

        Ok(OrderDetail {
            dealer_name: dealer.as_ref().map(|d| d.name.clone()),
            dealer_phone: dealer.and_then(|d| d.phone),
            contact_name: address.as_ref().map(|a| a.receiver.clone()),
            contact_phone: address.as_ref().map(|a| a.phone.clone()),
            full_address: address.as_ref().map(Address::full_address),
            order,
            items,
        })
    }
}
