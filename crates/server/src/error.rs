use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    address::AddressError, cart::CartError, dealer::DealerError, dialog_engine::DialogError,
    order::OrderError, product::ProductError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dialog(#[from] DialogError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Dealer(#[from] DealerError),
    #[error(transparent)]
    Product(#[from] ProductError),
}

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Order(OrderError::NotFound)
            | ApiError::Cart(CartError::NotFound | CartError::ProductNotFound(_))
            | ApiError::Address(AddressError::NotFound)
            | ApiError::Dealer(DealerError::NotFound)
            | ApiError::Product(ProductError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Address(AddressError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Address(AddressError::InUse) => StatusCode::CONFLICT,
            ApiError::Order(OrderError::Validation(_))
            | ApiError::Cart(CartError::Validation(_))
            | ApiError::Address(AddressError::Validation(_))
            | ApiError::Dealer(DealerError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Order(OrderError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors carry their own message. Server errors use the
    /// operation's fixed message where it has one, otherwise a generic one,
    /// so database details never reach the client.
    fn client_message(&self) -> String {
        match self {
            ApiError::Dialog(e @ DialogError::CatalogQueryFailed(_)) => e.to_string(),
            ApiError::Order(e @ (OrderError::WriteFailed(_) | OrderError::Timeout(_))) => {
                e.to_string()
            }
            _ if self.status_code().is_server_error() => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, source = ?std::error::Error::source(&self), "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(ApiResponse::<()>::error(self.client_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::to_bytes;

    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (status, _) = body_of(AddressError::Forbidden.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = body_of(AddressError::InUse.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "address is used by an order");

        let (status, _) = body_of(DealerError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = body_of(OrderError::Validation("order has no items".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid order: order has no items");

        let (status, _) = body_of(OrderError::Timeout(Duration::from_secs(10)).into()).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_server_errors_hide_database_details() {
        let (status, body) = body_of(OrderError::WriteFailed(sqlx::Error::PoolClosed).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "message": "order creation failed" })
        );

        let (_, body) = body_of(DialogError::CatalogQueryFailed(sqlx::Error::PoolClosed).into()).await;
        assert_eq!(body["message"], "search failed");

        let (_, body) = body_of(CartError::Database(sqlx::Error::PoolClosed).into()).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    }
}
