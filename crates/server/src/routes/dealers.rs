use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::dealer::{CreateDealer, Dealer, DealerFilter, UpdateDealer};
use services::services::dealer::DealerService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// GET /api/dealers?city=..&status=active
pub async fn list_dealers(
    State(state): State<AppState>,
    Query(filter): Query<DealerFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Dealer>>>, ApiError> {
    let dealers = DealerService::list(&state.db().pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(dealers)))
}

/// POST /api/dealers
pub async fn create_dealer(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateDealer>,
) -> Result<ResponseJson<ApiResponse<Dealer>>, ApiError> {
    let dealer = DealerService::create(&state.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(dealer)))
}

/// GET /api/dealers/{dealer_id}
pub async fn get_dealer(
    State(state): State<AppState>,
    Path(dealer_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Dealer>>, ApiError> {
    let dealer = DealerService::get(&state.db().pool, dealer_id).await?;
    Ok(ResponseJson(ApiResponse::success(dealer)))
}

/// PUT /api/dealers/{dealer_id}
pub async fn update_dealer(
    State(state): State<AppState>,
    Path(dealer_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateDealer>,
) -> Result<ResponseJson<ApiResponse<Dealer>>, ApiError> {
    let dealer = DealerService::update(&state.db().pool, dealer_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(dealer)))
}

/// DELETE /api/dealers/{dealer_id}
pub async fn delete_dealer(
    State(state): State<AppState>,
    Path(dealer_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    DealerService::delete(&state.db().pool, dealer_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/dealers",
        Router::new()
            .route("/", get(list_dealers).post(create_dealer))
            .route(
                "/{dealer_id}",
                get(get_dealer).put(update_dealer).delete(delete_dealer),
            ),
    )
}
