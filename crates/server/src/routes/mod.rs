use axum::{Router, response::Json as ResponseJson, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utils::response::ApiResponse;

use crate::AppState;

pub mod addresses;
pub mod cart;
pub mod dealers;
pub mod dialog;
pub mod orders;
pub mod products;

pub async fn health_check() -> ResponseJson<ApiResponse<&'static str>> {
    ResponseJson(ApiResponse::success("OK"))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .merge(dialog::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(addresses::router())
        .merge(dealers::router())
        .merge(orders::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use db::{
        DBService,
        models::{
            address::CreateAddress,
            cart::AddToCart,
            dealer::CreateDealer,
            product::{CreateProduct, Product},
        },
    };
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use services::services::{
        address::AddressService, cart::CartService, config::Config, dealer::DealerService,
    };
    use tower::ServiceExt;

    use super::*;

    async fn app() -> (Router, DBService) {
        let db = DBService::new_in_memory().await.unwrap();
        for (code, spec, pressure, price) in [
            ("PIPE-001", "dn110", "0.6MPa", "158.00"),
            ("PIPE-002", "dn110", "1.0MPa", "172.50"),
        ] {
            Product::create(
                &db.pool,
                &CreateProduct {
                    code: code.to_string(),
                    name: format!("联塑 PVC-U给水管 {spec}"),
                    brand: Some("联塑".to_string()),
                    specification: Some(spec.to_string()),
                    pressure: Some(pressure.to_string()),
                    price: Decimal::from_str(price).unwrap(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        let state = AppState::new(db.clone(), &Config::default()).unwrap();
        (router(state), db)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_dialog_parse_returns_tagged_outcome() {
        let (app, _db) = app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/dialog/parse",
            Some(json!({ "text": "联塑 dn110 0.6mpa" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["type"], "UNIQUE_MATCH");
        assert_eq!(body["data"]["product"]["code"], "PIPE-001");
        assert_eq!(body["data"]["product"]["price"], "158.00");

        let (_, body) = send(
            &app,
            "POST",
            "/api/dialog/parse",
            Some(json!({ "text": "联塑 DN110" })),
        )
        .await;
        assert_eq!(body["data"]["type"], "MULTIPLE_MATCHES");
        assert_eq!(body["data"]["missing_attributes"], json!(["pressure"]));
    }

    #[tokio::test]
    async fn test_checkout_flow_over_http() {
        let (app, db) = app().await;
        let address = AddressService::create(
            &db.pool,
            "u1",
            &CreateAddress {
                receiver: "李四".to_string(),
                phone: "13900000000".to_string(),
                province: "广东省".to_string(),
                city: "广州市".to_string(),
                district: "天河区".to_string(),
                detail: "体育西路 1 号".to_string(),
                is_default: None,
                tag: None,
            },
        )
        .await
        .unwrap();
        let dealer = DealerService::create(
            &db.pool,
            &CreateDealer {
                name: "天河建材".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        CartService::add(
            &db.pool,
            "u1",
            &AddToCart {
                product_code: "PIPE-002".to_string(),
                quantity: Some(2),
                attributes: None,
            },
        )
        .await
        .unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/u1/checkout",
            Some(json!({ "address_id": address.id, "dealer_id": dealer.id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_amount"], "345.00");
        let order_no = body["data"]["order_no"].as_str().unwrap().to_string();

        let (_, body) = send(&app, "GET", "/api/users/u1/cart", None).await;
        assert_eq!(body["data"], json!([]));

        let (status, body) = send(&app, "GET", &format!("/api/users/u1/orders/{order_no}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["dealer_name"], "天河建材");

        let (status, _) = send(&app, "GET", &format!("/api/users/u2/orders/{order_no}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_order_reports_generic_message() {
        let (app, _db) = app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/orders",
            Some(json!({
                "user_id": "u1",
                "address_id": uuid::Uuid::new_v4(),
                "dealer_id": uuid::Uuid::new_v4(),
                "items": [{ "product_code": "PIPE-001", "quantity": 1, "unit_price": "158.00",
                            "selected_color": null, "selected_length": null }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "message": "order creation failed" }));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (app, _db) = app().await;
        let (status, body) = send(&app, "GET", "/api/products/NOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, "GET", "/api/products?limit=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }
}
