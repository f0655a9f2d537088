//! End-to-end tests over the router with the in-memory store and a
//! recording payment processor.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use shop_api::{create_router, AppConfig, AppState};
use shop_core::{
    CatalogSeed, Charge, ChargeRequest, Currency, MemoryStore, PaymentProcessor, Product,
    ShippingRegion, ShippingType, ShopError, ShopResult, Stores,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct RecordingProcessor {
    charges: AtomicUsize,
}

#[async_trait]
impl PaymentProcessor for RecordingProcessor {
    async fn create_customer(&self, _email: &str, payment_token: &str) -> ShopResult<String> {
        if payment_token == "tok_chargeDeclined" {
            return Err(ShopError::ProviderError {
                provider: "test".into(),
                message: "Your card was declined.".into(),
            });
        }
        if payment_token == "tok_ledgerDown" {
            return Err(ShopError::Store("ledger connection reset".into()));
        }
        Ok("cus_test".to_string())
    }

    async fn charge(&self, request: &ChargeRequest) -> ShopResult<Charge> {
        let n = self.charges.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Charge {
            charge_id: format!("ch_{n}"),
            provider: "test".into(),
            amount_minor: request.amount_minor,
            currency: request.currency,
            paid: true,
            receipt_url: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "test"
    }
}

fn seed() -> CatalogSeed {
    let mut products = vec![
        Product::new(1, "Arc d'Triomphe", dec!(10.00)),
        Product::new(2, "Chartres Cathedral", dec!(8.00)).with_discount(dec!(6.00)),
    ];
    for id in 3..=12 {
        products.push(Product::new(id, format!("Shirt {id}"), dec!(12.00)));
    }

    CatalogSeed {
        products,
        shipping_regions: vec![ShippingRegion {
            shipping_region_id: 2,
            shipping_region: "US / Canada".into(),
        }],
        shipping_types: vec![ShippingType {
            shipping_id: 1,
            shipping_type: "Next Day Delivery ($20)".into(),
            shipping_cost: dec!(20.00),
            shipping_region_id: 2,
        }],
        ..Default::default()
    }
}

fn server_with(processor: Arc<RecordingProcessor>) -> TestServer {
    server_configured(processor, false)
}

fn server_configured(processor: Arc<RecordingProcessor>, expose_error_details: bool) -> TestServer {
    let stores = Stores::from_backend(Arc::new(MemoryStore::with_catalog(seed())));
    let mut config = AppConfig::with_jwt_key("integration-test-key");
    config.currency = Currency::USD;
    config.expose_error_details = expose_error_details;
    let state = AppState::from_parts(config, stores, processor, "memory");
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(Arc::new(RecordingProcessor::default()))
}

async fn signup(server: &TestServer, name: &str, email: &str) -> String {
    let response = server
        .post("/auth/signup")
        .json(&json!({ "name": name, "email": email, "password": "secret123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<Value>();
    let bearer = body["accessToken"].as_str().unwrap();
    bearer.strip_prefix("Bearer ").unwrap().to_string()
}

async fn fill_cart(server: &TestServer, cart_id: &str) {
    for product_id in [1, 2] {
        let response = server
            .post("/cart")
            .json(&json!({ "cart_id": cart_id, "product_id": product_id, "quantity": 2 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
}

async fn place_order(server: &TestServer, token: &str, cart_id: &str) -> Value {
    let response = server
        .post("/orders")
        .authorization_bearer(token)
        .json(&json!({ "shipping_id": 1, "cart_id": cart_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()
}

#[tokio::test]
async fn test_health() {
    let server = server();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_add_merges_by_increment() {
    let server = server();

    for _ in 0..2 {
        server
            .post("/cart")
            .json(&json!({ "cart_id": "cart-a", "product_id": 1 }))
            .await;
    }

    let body = server.get("/cart/cart-a").await.json::<Value>();
    let cart = body["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0]["quantity"], 2);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let server = server();

    let response = server
        .post("/cart")
        .json(&json!({ "cart_id": "cart-a", "product_id": 999 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["status"], false);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_add_rejects_zero_quantity() {
    let server = server();

    let response = server
        .post("/cart")
        .json(&json!({ "cart_id": "cart-a", "product_id": 1, "quantity": 0 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["details"]["quantity"].is_array());
}

#[tokio::test]
async fn test_gate_rejects_missing_and_bad_tokens() {
    let server = server();

    let missing = server.get("/orders").await;
    assert_eq!(missing.status_code(), StatusCode::FORBIDDEN);

    let garbage = server.get("/orders").authorization_bearer("not-a-jwt").await;
    assert_eq!(garbage.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_then_login() {
    let server = server();
    signup(&server, "Jane Doe", "jane@mail.com").await;

    let duplicate = server
        .post("/auth/signup")
        .json(&json!({ "name": "Jane Again", "email": "jane@mail.com", "password": "secret123" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let bad = server
        .post("/auth/login")
        .json(&json!({ "email": "jane@mail.com", "password": "wrong-password" }))
        .await;
    assert_eq!(bad.status_code(), StatusCode::UNAUTHORIZED);

    let good = server
        .post("/auth/login")
        .json(&json!({ "email": "jane@mail.com", "password": "secret123" }))
        .await;
    assert_eq!(good.status_code(), StatusCode::OK);
    let body = good.json::<Value>();
    assert_eq!(body["customer"]["email"], "jane@mail.com");
    assert!(body["customer"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_validation() {
    let server = server();

    let response = server
        .post("/auth/signup")
        .json(&json!({ "name": "Al", "email": "not-an-email", "password": "123" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let details = &response.json::<Value>()["details"];
    assert!(details["name"].is_array());
    assert!(details["email"].is_array());
    assert!(details["password"].is_array());
}

#[tokio::test]
async fn test_order_then_charge() {
    let processor = Arc::new(RecordingProcessor::default());
    let server = server_with(processor.clone());
    let token = signup(&server, "Jane Doe", "jane@mail.com").await;
    fill_cart(&server, "cart-jane").await;

    let body = place_order(&server, &token, "cart-jane").await;
    assert_eq!(body["order"]["total_amount"], "44.00");
    assert_eq!(body["order"]["status"], "unpaid");
    let order_id = body["order"]["order_id"].as_i64().unwrap();

    let summary = server
        .get(&format!("/orders/{order_id}"))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(summary["order"]["order_items"].as_array().unwrap().len(), 2);

    let charge = server
        .post("/stripe/charge")
        .authorization_bearer(&token)
        .json(&json!({ "order_id": order_id, "stripe_token": "tok_visa" }))
        .await;
    assert_eq!(charge.status_code(), StatusCode::CREATED);
    let charged = charge.json::<Value>();
    assert_eq!(charged["charge"]["amount_minor"], 4400);
    assert_eq!(charged["order"]["status"], "paid");

    // paid orders are no longer chargeable
    let again = server
        .post("/stripe/charge")
        .authorization_bearer(&token)
        .json(&json!({ "order_id": order_id, "stripe_token": "tok_visa" }))
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(processor.charges.load(Ordering::SeqCst), 1);

    // settling cleared the cart
    let cart = server.get("/cart/cart-jane").await.json::<Value>();
    assert!(cart["cart"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_declined_card_is_bad_gateway_and_leaves_order_unpaid() {
    let server = server();
    let token = signup(&server, "Jane Doe", "jane@mail.com").await;
    fill_cart(&server, "cart-jane").await;
    let order_id = place_order(&server, &token, "cart-jane").await["order"]["order_id"]
        .as_i64()
        .unwrap();

    let response = server
        .post("/stripe/charge")
        .authorization_bearer(&token)
        .json(&json!({ "order_id": order_id, "stripe_token": "tok_chargeDeclined" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["message"], "Your card was declined.");

    let summary = server
        .get(&format!("/orders/{order_id}"))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(summary["order"]["status"], "unpaid");
}

async fn charge_with_failing_ledger(server: &TestServer) -> Value {
    let token = signup(server, "Jane Doe", "jane@mail.com").await;
    fill_cart(server, "cart-jane").await;
    let order_id = place_order(server, &token, "cart-jane").await["order"]["order_id"]
        .as_i64()
        .unwrap();

    let response = server
        .post("/stripe/charge")
        .authorization_bearer(&token)
        .json(&json!({ "order_id": order_id, "stripe_token": "tok_ledgerDown" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    response.json::<Value>()
}

#[tokio::test]
async fn test_internal_error_text_stays_out_of_body_by_default() {
    let server = server();
    let body = charge_with_failing_ledger(&server).await;

    assert_eq!(body["message"], "An unexpected error occurred");
    assert!(body.get("details").is_none());
    assert!(!body.to_string().contains("ledger connection reset"));
}

#[tokio::test]
async fn test_internal_error_text_exposed_when_configured() {
    let server = server_configured(Arc::new(RecordingProcessor::default()), true);
    let body = charge_with_failing_ledger(&server).await;

    assert_eq!(body["message"], "An unexpected error occurred");
    assert_eq!(body["error"], "unexpected");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("ledger connection reset"));
}

#[tokio::test]
async fn test_foreign_order_is_not_found() {
    let server = server();
    let jane = signup(&server, "Jane Doe", "jane@mail.com").await;
    let john = signup(&server, "John Doe", "john@mail.com").await;
    fill_cart(&server, "cart-jane").await;
    let order_id = place_order(&server, &jane, "cart-jane").await["order"]["order_id"]
        .as_i64()
        .unwrap();

    let read = server
        .get(&format!("/orders/{order_id}"))
        .authorization_bearer(&john)
        .await;
    assert_eq!(read.status_code(), StatusCode::NOT_FOUND);

    let pay = server
        .post("/stripe/charge")
        .authorization_bearer(&john)
        .json(&json!({ "order_id": order_id, "stripe_token": "tok_visa" }))
        .await;
    assert_eq!(pay.status_code(), StatusCode::NOT_FOUND);

    let listed = server
        .get("/orders")
        .authorization_bearer(&john)
        .await
        .json::<Value>();
    assert!(listed["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_shipping_is_bad_request() {
    let server = server();
    let token = signup(&server, "Jane Doe", "jane@mail.com").await;
    fill_cart(&server, "cart-jane").await;

    let response = server
        .post("/orders")
        .authorization_bearer(&token)
        .json(&json!({ "shipping_id": 99, "cart_id": "cart-jane" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_without_cart_is_rejected() {
    let server = server();
    let token = signup(&server, "Jane Doe", "jane@mail.com").await;

    let response = server
        .post("/orders")
        .authorization_bearer(&token)
        .json(&json!({ "shipping_id": 1 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_product_paging() {
    let server = server();

    let body = server
        .get("/products?page=2&limit=5")
        .await
        .json::<Value>();

    assert_eq!(body["rows"].as_array().unwrap().len(), 5);
    assert_eq!(body["rows"][0]["product_id"], 6);
    assert_eq!(body["meta"]["currentPage"], 2);
    assert_eq!(body["meta"]["totalPages"], 3);
    assert_eq!(body["meta"]["totalRecords"], 12);
}

#[tokio::test]
async fn test_product_search_and_lookup() {
    let server = server();

    let body = server.get("/products?search=chartres").await.json::<Value>();
    assert_eq!(body["meta"]["totalRecords"], 1);
    assert_eq!(body["rows"][0]["discounted_price"], "6.00");

    let missing = server.get("/products/999").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_credit_card_is_masked() {
    let server = server();
    let token = signup(&server, "Jane Doe", "jane@mail.com").await;

    let response = server
        .put("/customer/creditCard")
        .authorization_bearer(&token)
        .json(&json!({ "credit_card": "4242424242424242" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let card = response.json::<Value>()["customer"]["credit_card"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(card.ends_with("4242"));
    assert!(!card.contains("42424242"));
}
