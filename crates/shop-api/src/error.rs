//! # API Errors
//!
//! Every handler returns `Result<_, ApiError>`. Domain errors keep their
//! status code and stable `error` kind; unexpected failures are logged in
//! full and reach the client as a generic message. The full text rides along
//! as a response extension, which [`crate::middleware::expose_error_details`]
//! writes into the body when the configuration allows it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shop_core::ShopError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Internal error text withheld from an error response body
#[derive(Debug, Clone)]
pub struct WithheldDetails {
    pub body: ErrorResponse,
    pub detail: String,
}

impl WithheldDetails {
    /// The original response with `details` filled in
    pub fn into_exposed(self, status: StatusCode) -> Response {
        let body = ErrorResponse {
            details: Some(serde_json::Value::String(self.detail)),
            ..self.body
        };
        (status, Json(body)).into_response()
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub code: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Shop(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Shop(err) => err.kind(),
            Self::Validation(_) => "validation_failed",
            Self::Session(_) => "unexpected",
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            Self::Shop(err) => err.is_internal(),
            Self::Validation(_) => false,
            Self::Session(_) => true,
        }
    }

    /// Message safe to show a client
    fn public_message(&self) -> String {
        match self {
            Self::Shop(ShopError::Forbidden(msg))
            | Self::Shop(ShopError::Unauthorized(msg))
            | Self::Shop(ShopError::Conflict(msg))
            | Self::Shop(ShopError::ValidationFailed(msg)) => msg.clone(),
            Self::Shop(ShopError::ProviderError { message, .. }) => message.clone(),
            Self::Validation(_) => "Request validation failed".to_string(),
            _ if self.is_internal() => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = status.as_u16(), "request failed");
        }

        let details = match &self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        let body = ErrorResponse {
            status: false,
            code: status.as_u16(),
            error: self.kind(),
            message: self.public_message(),
            details,
        };

        let mut response = (status, Json(body.clone())).into_response();
        if self.is_internal() {
            response.extensions_mut().insert(WithheldDetails {
                body,
                detail: self.to_string(),
            });
        }
        response
    }
}
