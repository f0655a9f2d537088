//! Signup, login and profile endpoints.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;
use shop_core::{AddressUpdate, AuthSession, Identity, ProfileUpdate};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 4, max = 50, message = "name must be 4 to 50 characters"))]
    pub name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 4, max = 50))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub day_phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub eve_phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub mob_phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub address_1: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub address_2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub region: String,
    #[validate(length(min = 1, max = 100))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(range(min = 1))]
    pub shipping_region_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreditCardRequest {
    #[validate(length(min = 12, max = 23))]
    pub credit_card: String,
}

fn session_body(session: AuthSession) -> serde_json::Value {
    json!({
        "status": true,
        "customer": session.customer,
        "accessToken": session.access_token,
        "expires_in": session.expires_in,
    })
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let session = state
        .accounts
        .signup(&request.name, &request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(session_body(session))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let session = state
        .accounts
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(session_body(session)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.accounts.profile(customer.customer_id).await?;

    Ok(Json(json!({ "status": true, "customer": profile })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let update = ProfileUpdate {
        name: request.name,
        day_phone: request.day_phone,
        eve_phone: request.eve_phone,
        mob_phone: request.mob_phone,
    };
    let profile = state
        .accounts
        .update_profile(customer.customer_id, &update)
        .await?;

    Ok(Json(json!({ "status": true, "customer": profile })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    Json(request): Json<PasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    state
        .accounts
        .change_password(
            customer.customer_id,
            &request.current_password,
            &request.new_password,
        )
        .await?;

    Ok(Json(json!({
        "status": true,
        "message": "Password updated successfully",
    })))
}

pub async fn update_address(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    Json(request): Json<AddressRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let update = AddressUpdate {
        address_1: request.address_1,
        address_2: request.address_2,
        city: request.city,
        region: request.region,
        postal_code: request.postal_code,
        country: request.country,
        shipping_region_id: request.shipping_region_id,
    };
    let profile = state
        .accounts
        .update_address(customer.customer_id, &update)
        .await?;

    Ok(Json(json!({ "status": true, "customer": profile })))
}

pub async fn update_credit_card(
    State(state): State<AppState>,
    Extension(customer): Extension<Identity>,
    Json(request): Json<CreditCardRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let profile = state
        .accounts
        .update_credit_card(customer.customer_id, &request.credit_card)
        .await?;

    Ok(Json(json!({ "status": true, "customer": profile })))
}
