//! # shop-core
//!
//! Core types, services and store traits for the shopmate storefront.
//!
//! This crate provides:
//! - Catalog, cart, order and customer types
//! - `CatalogStore`, `CartStore`, `OrderStore` and `CustomerStore` traits,
//!   with an in-memory implementation
//! - `PaymentProcessor` trait for external payment providers
//! - Services for carts, order materialization, payment capture and accounts
//! - `TokenService` and bearer-header authentication
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{AddCartItem, CartId, CartService, MemoryStore, OrderService, Stores};
//!
//! let stores = Stores::from_backend(Arc::new(MemoryStore::with_catalog(seed)));
//! let carts = CartService::new(stores.carts.clone());
//! let orders = OrderService::new(stores.catalog.clone(), stores.carts.clone(), stores.orders.clone());
//!
//! let cart = CartId::generate();
//! carts.add_or_merge_item(AddCartItem::new(cart.clone(), 1)).await?;
//!
//! let order = orders.create_order(&cart, shipping_id, &identity).await?;
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod error;
pub mod memory;
pub mod money;
pub mod order;
pub mod pagination;
pub mod password;
pub mod payment;
pub mod service;
pub mod store;
pub mod token;

// Re-exports for convenience
pub use auth::{authenticate, AuthError};
pub use cart::{AddCartItem, CartId, CartItem, CartLine};
pub use catalog::{
    CatalogSeed, Category, Department, Product, ProductCategory, ShippingRegion, ShippingType,
};
pub use customer::{mask_card, AddressUpdate, Customer, CustomerProfile, NewCustomer, ProfileUpdate};
pub use error::{ShopError, ShopResult};
pub use memory::MemoryStore;
pub use money::Currency;
pub use order::{
    DuplicateOrderPolicy, Order, OrderDetail, OrderDraft, OrderStatus, OrderSummary, OrderTotals,
};
pub use pagination::{Page, PageMeta, Pagination};
pub use payment::{BoxedPaymentProcessor, Charge, ChargeRequest, PaymentProcessor};
pub use service::{
    AccountService, AuthSession, CaptureReceipt, CaptureService, CartService, OrderService,
};
pub use store::{
    CartStore, CatalogStore, CustomerStore, OrderStore, Stores, CAPTURE_CLAIM_TTL_SECS,
};
pub use token::{Identity, TokenError, TokenService, DEFAULT_TOKEN_TTL_HOURS};
