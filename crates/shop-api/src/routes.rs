//! # Routes
//!
//! Axum router for the storefront API.

use crate::handlers::{self, cart, catalog, customers, orders};
use crate::middleware::{expose_error_details, require_customer};
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    middleware::{from_fn_with_state, map_response},
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};
use tracing::warn;

/// Create the main application router
///
/// Public:
///   - GET  /, /health
///   - GET  /products, /products/{id}, /products/inCategory/{id}, /products/inDepartment/{id}
///   - GET  /departments, /departments/{id}, /categories
///   - GET  /shipping/regions, /shipping/regions/{id}
///   - GET  /cart/generate, /cart, /cart/{cart_id}; POST /cart
///   - DELETE /cart, /cart/items/{item_id}
///   - POST /auth/signup, /auth/login
///
/// Bearer token required:
///   - GET/PUT /customer, PUT /customer/password, /customer/address, /customer/creditCard
///   - POST /orders, GET /orders, GET /orders/{id}
///   - POST /stripe/charge
pub fn create_router(state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/{product_id}", get(catalog::get_product))
        .route(
            "/products/inCategory/{category_id}",
            get(catalog::products_in_category),
        )
        .route(
            "/products/inDepartment/{department_id}",
            get(catalog::products_in_department),
        )
        .route("/departments", get(catalog::list_departments))
        .route("/departments/{department_id}", get(catalog::get_department))
        .route("/categories", get(catalog::list_categories))
        .route("/shipping/regions", get(catalog::list_shipping_regions))
        .route(
            "/shipping/regions/{shipping_region_id}",
            get(catalog::list_shipping_types),
        );

    let cart_routes = Router::new()
        .route("/cart/generate", get(cart::generate_cart_id))
        .route(
            "/cart",
            get(cart::list_session_cart)
                .post(cart::add_item)
                .delete(cart::clear_cart),
        )
        .route("/cart/{cart_id}", get(cart::list_cart))
        .route("/cart/items/{item_id}", delete(cart::remove_item));

    let auth_routes = Router::new()
        .route("/auth/signup", post(customers::signup))
        .route("/auth/login", post(customers::login));

    let customer_routes = Router::new()
        .route(
            "/customer",
            get(customers::get_profile).put(customers::update_profile),
        )
        .route("/customer/password", put(customers::change_password))
        .route("/customer/address", put(customers::update_address))
        .route("/customer/creditCard", put(customers::update_credit_card))
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/stripe/charge", post(orders::charge))
        .route_layer(from_fn_with_state(state.clone(), require_customer));

    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.is_production())
        .with_same_site(SameSite::Lax);

    let mut router = Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))
        .merge(catalog_routes)
        .merge(cart_routes)
        .merge(auth_routes)
        .merge(customer_routes);

    if state.config.expose_error_details {
        router = router.layer(map_response(expose_error_details));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(state.config.cors_origin.as_deref()))
                .layer(sessions),
        )
        .with_state(state)
}

/// Single configured origin, or any origin when unset
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            warn!("CORS_ORIGIN is not a valid header value, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
