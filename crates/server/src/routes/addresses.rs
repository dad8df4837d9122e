use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::address::{Address, CreateAddress, UpdateAddress};
use services::services::address::AddressService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// GET /api/users/{user_id}/addresses
/// Default address first, then newest first
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Vec<Address>>>, ApiError> {
    let addresses = AddressService::list(&state.db().pool, &user_id).await?;
    Ok(ResponseJson(ApiResponse::success(addresses)))
}

/// GET /api/users/{user_id}/addresses/default
pub async fn get_default_address(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Option<Address>>>, ApiError> {
    let address = AddressService::get_default(&state.db().pool, &user_id).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

/// POST /api/users/{user_id}/addresses
pub async fn create_address(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    axum::Json(payload): axum::Json<CreateAddress>,
) -> Result<ResponseJson<ApiResponse<Address>>, ApiError> {
    let address = AddressService::create(&state.db().pool, &user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

/// GET /api/users/{user_id}/addresses/{address_id}
pub async fn get_address(
    State(state): State<AppState>,
    Path((user_id, address_id)): Path<(String, Uuid)>,
) -> Result<ResponseJson<ApiResponse<Address>>, ApiError> {
    let address = AddressService::get(&state.db().pool, &user_id, address_id).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

/// PUT /api/users/{user_id}/addresses/{address_id}
pub async fn update_address(
    State(state): State<AppState>,
    Path((user_id, address_id)): Path<(String, Uuid)>,
    axum::Json(payload): axum::Json<UpdateAddress>,
) -> Result<ResponseJson<ApiResponse<Address>>, ApiError> {
    let address = AddressService::update(&state.db().pool, &user_id, address_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

/// PUT /api/users/{user_id}/addresses/{address_id}/default
pub async fn set_default_address(
    State(state): State<AppState>,
    Path((user_id, address_id)): Path<(String, Uuid)>,
) -> Result<ResponseJson<ApiResponse<Address>>, ApiError> {
    let address = AddressService::set_default(&state.db().pool, &user_id, address_id).await?;
    Ok(ResponseJson(ApiResponse::success(address)))
}

/// DELETE /api/users/{user_id}/addresses/{address_id}
pub async fn delete_address(
    State(state): State<AppState>,
    Path((user_id, address_id)): Path<(String, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    AddressService::delete(&state.db().pool, &user_id, address_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/addresses",
        Router::new()
            .route("/", get(list_addresses).post(create_address))
            .route("/default", get(get_default_address))
            .route(
                "/{address_id}",
                get(get_address).put(update_address).delete(delete_address),
            )
            .route("/{address_id}/default", put(set_default_address)),
    )
}
