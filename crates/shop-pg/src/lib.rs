//! # shop-pg
//!
//! PostgreSQL implementation of the shopmate store traits.
//!
//! ## Tables
//!
//! - `department`, `category`, `product`, `product_category` - catalog
//! - `shipping_region`, `shipping` - shipping options and costs
//! - `customer` - accounts (email unique, case-insensitive)
//! - `shopping_cart` - cart lines, unique per (cart_id, product_id)
//! - `orders`, `order_detail` - order headers and line snapshots
//!
//! Migrations live in `crates/shop-pg/migrations/` and are embedded in the
//! binary; [`PgStore::migrate`] applies them at startup.

mod carts;
mod catalog;
mod customers;
mod orders;
mod pool;

pub use pool::{create_pool, PgStore};

use shop_core::ShopError;

/// Map a driver error onto the domain error
pub(crate) fn store_err(err: sqlx::Error) -> ShopError {
    ShopError::Store(err.to_string())
}
