//! # Shop Error Types
//!
//! Typed error handling for the shopmate storefront.
//! Every service and store operation returns `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request data failed validation
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Product not found in catalog
    #[error("Product with product id {product_id} does not exist")]
    ProductNotFound { product_id: i32 },

    /// Shipping type not found (rejected at order creation)
    #[error("Invalid shipping type provided: {shipping_id}")]
    InvalidShipping { shipping_id: i32 },

    /// Order missing, owned by someone else, or already paid
    #[error("Order with order id {order_id} does not exist")]
    OrderNotFound { order_id: i32 },

    /// Department not found
    #[error("Department with id {department_id} does not exist")]
    DepartmentNotFound { department_id: i32 },

    /// Customer not found
    #[error("Customer not found")]
    CustomerNotFound,

    /// No credential supplied
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Credential missing, malformed, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unique key collision (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Amount cannot be expressed for the processor
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Payment provider rejected the request (card decline, bad token)
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShopError::NetworkError(_) | ShopError::ProviderError { .. } | ShopError::Store(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::ValidationFailed(_) => 422,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::InvalidShipping { .. } => 400,
            ShopError::OrderNotFound { .. } => 404,
            ShopError::DepartmentNotFound { .. } => 404,
            ShopError::CustomerNotFound => 404,
            ShopError::Forbidden(_) => 403,
            ShopError::Unauthorized(_) => 401,
            ShopError::Conflict(_) => 409,
            ShopError::InvalidAmount { .. } => 400,
            ShopError::ProviderError { .. } => 502,
            ShopError::NetworkError(_) => 503,
            ShopError::Store(_) => 500,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Stable, machine-discriminable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ShopError::ProductNotFound { .. }
            | ShopError::OrderNotFound { .. }
            | ShopError::DepartmentNotFound { .. }
            | ShopError::CustomerNotFound => "not_found",
            ShopError::InvalidShipping { .. } | ShopError::InvalidAmount { .. } => "bad_request",
            ShopError::ValidationFailed(_) => "validation_failed",
            ShopError::Forbidden(_) => "forbidden",
            ShopError::Unauthorized(_) => "unauthorized",
            ShopError::Conflict(_) => "conflict",
            ShopError::ProviderError { .. } | ShopError::NetworkError(_) => "upstream_failure",
            ShopError::Configuration(_)
            | ShopError::Store(_)
            | ShopError::Serialization(_)
            | ShopError::Internal(_) => "unexpected",
        }
    }

    /// True for failures whose message must not reach the client
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500 && !matches!(self, ShopError::ProviderError { .. })
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ShopError::NetworkError("timeout".into()).is_retryable());
        assert!(ShopError::ProviderError {
            provider: "stripe".into(),
            message: "card declined".into()
        }
        .is_retryable());
        assert!(!ShopError::OrderNotFound { order_id: 1 }.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::ProductNotFound { product_id: 9 }.status_code(), 404);
        assert_eq!(ShopError::InvalidShipping { shipping_id: 2 }.status_code(), 400);
        assert_eq!(ShopError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(ShopError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(ShopError::Conflict("x".into()).status_code(), 409);
        assert_eq!(ShopError::ValidationFailed("x".into()).status_code(), 422);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ShopError::OrderNotFound { order_id: 3 }.kind(), "not_found");
        assert_eq!(ShopError::NetworkError("down".into()).kind(), "upstream_failure");
        assert_eq!(ShopError::Store("pool closed".into()).kind(), "unexpected");
    }

    #[test]
    fn test_internal_errors_are_hidden() {
        assert!(ShopError::Store("relation missing".into()).is_internal());
        assert!(!ShopError::ProviderError {
            provider: "stripe".into(),
            message: "declined".into()
        }
        .is_internal());
        assert!(!ShopError::OrderNotFound { order_id: 1 }.is_internal());
    }

    #[test]
    fn test_not_found_message() {
        let err = ShopError::ProductNotFound { product_id: 42 };
        assert_eq!(err.to_string(), "Product with product id 42 does not exist");
    }
}
