use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::order::Order;
use services::services::order::{CheckoutRequest, CreateOrder, OrderCreated, OrderDetail};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// POST /api/orders
/// Create an order from explicit lines; the user's cart is emptied on success
pub async fn create_order(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateOrder>,
) -> Result<ResponseJson<ApiResponse<OrderCreated>>, ApiError> {
    let created = state.orders().create_order(&payload).await?;
    let message = created.message.clone();
    Ok(ResponseJson(ApiResponse::success_with_message(created, message)))
}

/// POST /api/users/{user_id}/checkout
pub async fn checkout_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    axum::Json(payload): axum::Json<CheckoutRequest>,
) -> Result<ResponseJson<ApiResponse<OrderCreated>>, ApiError> {
    let created = state.orders().checkout_cart(&user_id, payload).await?;
    let message = created.message.clone();
    Ok(ResponseJson(ApiResponse::success_with_message(created, message)))
}

/// GET /api/users/{user_id}/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = state.orders().list_orders(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

/// GET /api/users/{user_id}/orders/{order_no}
pub async fn get_order_detail(
    State(state): State<AppState>,
    Path((user_id, order_no)): Path<(String, String)>,
) -> Result<ResponseJson<ApiResponse<OrderDetail>>, ApiError> {
    let detail = state.orders().get_order_detail(&user_id, &order_no).await?;
    Ok(ResponseJson(ApiResponse::success(detail)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/users/{user_id}/checkout", post(checkout_cart))
        .route("/users/{user_id}/orders", get(list_orders))
        .route("/users/{user_id}/orders/{order_no}", get(get_order_detail))
}
