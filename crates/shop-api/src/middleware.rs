//! Bearer-token gate for customer routes, and the development-only layer
//! that puts internal error text back into error bodies.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use shop_core::{authenticate, ShopError};

use crate::error::{ApiError, WithheldDetails};
use crate::state::AppState;

/// Verify `Authorization: Bearer <token>` and put the [`shop_core::Identity`]
/// into request extensions for the handler.
pub async fn require_customer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    let identity = authenticate(header, &state.tokens).map_err(|e| {
        tracing::debug!(reason = %e, "request rejected by auth gate");
        ApiError::from(ShopError::from(e))
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Restore withheld internal error details; mounted only when
/// `AppConfig::expose_error_details` is set
pub async fn expose_error_details(mut response: Response) -> Response {
    match response.extensions_mut().remove::<WithheldDetails>() {
        Some(withheld) => withheld.into_exposed(response.status()),
        None => response,
    }
}
