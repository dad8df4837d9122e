//! Conversational product search.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use db::models::product::AttributeSet;
use services::services::dialog_engine::{DialogInput, ResolutionOutcome};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// POST /api/dialog/parse
/// Parse free text into slots and resolve them against the catalog
pub async fn parse_dialog(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<DialogInput>,
) -> Result<ResponseJson<ApiResponse<ResolutionOutcome>>, ApiError> {
    let outcome = state.dialog().process_user_input(&payload.text).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

/// POST /api/dialog/resolve
/// Resolve an explicit attribute set, e.g. after a disambiguation choice
pub async fn resolve_attributes(
    State(state): State<AppState>,
    axum::Json(slots): axum::Json<AttributeSet>,
) -> Result<ResponseJson<ApiResponse<ResolutionOutcome>>, ApiError> {
    let outcome = state.dialog().resolve(&slots).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/dialog",
        Router::new()
            .route("/parse", post(parse_dialog))
            .route("/resolve", post(resolve_attributes)),
    )
}
