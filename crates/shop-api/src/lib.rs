//! # shop-api
//!
//! HTTP API layer for shopmate.
//!
//! This crate provides:
//! - Axum-based HTTP server with session-backed carts
//! - Bearer-token gate for customer, order and payment routes
//! - One error mapper turning [`shop_core::ShopError`] into JSON responses
//!
//! ## Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | GET | `/health` | no | Health check |
//! | GET | `/products` | no | Paged products, optional `search` |
//! | POST | `/cart` | no | Add or merge a cart item |
//! | GET | `/cart/{cart_id}` | no | Items in a cart |
//! | POST | `/auth/signup` | no | Register and get a token |
//! | POST | `/orders` | yes | Turn a cart into an order |
//! | GET | `/orders/{id}` | yes | Order summary with items |
//! | POST | `/stripe/charge` | yes | Pay an unpaid order |
//!
//! See [`routes::create_router`] for the full list.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
