use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::product::Product;
use serde::Deserialize;
use services::services::product::ProductService;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub limit: Option<i64>,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = ProductService::list(&state.db().pool, query.limit).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

/// GET /api/products/{code}
pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = ProductService::get(&state.db().pool, &code).await?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/products",
        Router::new()
            .route("/", get(list_products))
            .route("/{code}", get(get_product)),
    )
}
