//! Order and payment endpoints (all behind the auth gate).

use crate::error::ApiResult;
use crate::handlers::cart::session_cart;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use shop_core::{CartId, Identity, ShopError};
use tower_sessions::Session;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub shipping_id: i32,
    /// Falls back to the session cart
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub cart_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChargeRequestBody {
    pub order_id: i32,
    /// Receipt email; defaults to the customer's
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub stripe_token: String,
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    session: Session,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let cart_id = match request.cart_id {
        Some(id) => CartId::from(id),
        None => session_cart(&session).await?.ok_or_else(|| {
            ShopError::ValidationFailed("cart_id is required".to_string())
        })?,
    };

    let order = state
        .orders
        .create_order(&cart_id, request.shipping_id, &customer)
        .await?;

    Ok(Json(json!({
        "status": true,
        "order": order,
        "message": "Order created successfully",
    })))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let orders = state.orders.get_customer_orders(customer.customer_id).await?;

    Ok(Json(json!({
        "status": true,
        "orders": orders,
    })))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    Path(order_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let order = state
        .orders
        .get_order_summary(order_id, customer.customer_id)
        .await?;

    Ok(Json(json!({
        "status": true,
        "order": order,
    })))
}

pub async fn charge(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    Json(request): Json<ChargeRequestBody>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let email = request.email.as_deref().unwrap_or(&customer.email);
    let receipt = state
        .capture
        .capture_payment(
            request.order_id,
            customer.customer_id,
            email,
            &request.stripe_token,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": true,
            "charge": receipt.charge,
            "order": receipt.order,
            "message": "Order paid successfully",
        })),
    ))
}
