//! Cart endpoints. The browser keeps its cart id in the session; add-item
//! names the cart explicitly.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use shop_core::{AddCartItem, CartId};
use tower_sessions::Session;
use validator::Validate;

pub(crate) const SESSION_CART_KEY: &str = "cart_id";

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(length(min = 1, max = 64))]
    pub cart_id: String,
    pub product_id: i32,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub attributes: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

/// Cart id stored in the session, if any
pub(crate) async fn session_cart(session: &Session) -> ApiResult<Option<CartId>> {
    Ok(session.get::<CartId>(SESSION_CART_KEY).await?)
}

/// Return the session's cart id, creating one on first use
pub async fn generate_cart_id(session: Session) -> ApiResult<impl IntoResponse> {
    let cart_id = match session_cart(&session).await? {
        Some(id) => id,
        None => {
            let id = CartId::generate();
            session.insert(SESSION_CART_KEY, &id).await?;
            id
        }
    };

    Ok(Json(json!({
        "status": true,
        "cart_id": cart_id,
    })))
}

pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let mut add = AddCartItem::new(CartId::from(request.cart_id), request.product_id);
    add.attributes = request.attributes;
    add.quantity = request.quantity;

    let cart = state.carts.add_or_merge_item(add).await?;

    Ok(Json(json!({
        "status": true,
        "cart": cart,
    })))
}

/// Items in the session cart; empty when the session has none
pub async fn list_session_cart(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<impl IntoResponse> {
    let cart = match session_cart(&session).await? {
        Some(id) => state.carts.list(&id).await?,
        None => Vec::new(),
    };

    Ok(Json(json!({
        "status": true,
        "cart": cart,
    })))
}

pub async fn list_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let cart = state.carts.list(&CartId::from(cart_id)).await?;

    Ok(Json(json!({
        "status": true,
        "cart": cart,
    })))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<impl IntoResponse> {
    if let Some(id) = session_cart(&session).await? {
        state.carts.clear(&id).await?;
    }

    Ok(Json(json!({
        "status": true,
        "cart": [],
        "message": "Shopping cart cleared successfully",
    })))
}

pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    if let Some(id) = session_cart(&session).await? {
        state.carts.remove_item(&id, item_id).await?;
    }

    Ok(Json(json!({
        "status": true,
        "message": "Item removed from cart successfully",
    })))
}
