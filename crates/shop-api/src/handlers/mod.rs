//! # Request Handlers
//!
//! Axum handlers grouped by resource. Success bodies carry `"status": true`;
//! failures go through [`crate::error::ApiError`].

pub mod cart;
pub mod catalog;
pub mod customers;
pub mod orders;

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Welcome message
pub async fn welcome() -> impl IntoResponse {
    Json(json!({
        "status": true,
        "message": "Welcome to the shopmate API",
    }))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "shopmate",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.backend,
        "environment": state.config.environment,
    }))
}
