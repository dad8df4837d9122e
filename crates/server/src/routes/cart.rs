use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::cart::{AddToCart, CartItem, CartItemWithProduct};
use services::services::cart::{CartService, UpdateCartItem};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// GET /api/users/{user_id}/cart
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Vec<CartItemWithProduct>>>, ApiError> {
    let items = CartService::list(&state.db().pool, &user_id).await?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

/// POST /api/users/{user_id}/cart
/// Adding a product already in the cart increases that line's quantity
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    axum::Json(payload): axum::Json<AddToCart>,
) -> Result<ResponseJson<ApiResponse<CartItem>>, ApiError> {
    let item = CartService::add(&state.db().pool, &user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// DELETE /api/users/{user_id}/cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let removed = CartService::clear(&state.db().pool, &user_id).await?;
    Ok(ResponseJson(ApiResponse::success(removed)))
}

/// PUT /api/users/{user_id}/cart/{item_id}
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, Uuid)>,
    axum::Json(payload): axum::Json<UpdateCartItem>,
) -> Result<ResponseJson<ApiResponse<CartItem>>, ApiError> {
    let item =
        CartService::update_quantity(&state.db().pool, &user_id, item_id, payload.quantity).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// DELETE /api/users/{user_id}/cart/{item_id}
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    CartService::remove_item(&state.db().pool, &user_id, item_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/cart",
        Router::new()
            .route("/", get(get_cart).post(add_to_cart).delete(clear_cart))
            .route("/{item_id}", put(update_cart_item).delete(remove_cart_item)),
    )
}
