//! # Store Traits
//!
//! Persistence seams for the storefront. Services depend on these traits
//! only; `MemoryStore` (this crate) and `PgStore` (`shop-pg`) implement them.
//!
//! Every method that writes more than one row is atomic: callers never see
//! an order without its line items, and cart upserts on the same
//! (cart, product) pair serialize inside the store.

use crate::cart::{AddCartItem, CartId, CartItem, CartLine};
use crate::catalog::{Category, Department, Product, ShippingRegion, ShippingType};
use crate::customer::{AddressUpdate, Customer, NewCustomer, ProfileUpdate};
use crate::error::ShopResult;
use crate::order::{DuplicateOrderPolicy, Order, OrderDraft, OrderSummary};
use crate::pagination::{Page, Pagination};
use async_trait::async_trait;
use std::sync::Arc;

/// Seconds after which an unsettled capture claim can be taken over
pub const CAPTURE_CLAIM_TTL_SECS: i64 = 600;

/// Read-only catalog queries, returning flattened view models
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_product(&self, product_id: i32) -> ShopResult<Option<Product>>;

    /// Products ordered by id, optionally filtered on name/description
    async fn list_products(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> ShopResult<Page<Product>>;

    async fn list_products_in_category(
        &self,
        category_id: i32,
        page: Pagination,
    ) -> ShopResult<Page<Product>>;

    async fn list_products_in_department(
        &self,
        department_id: i32,
        page: Pagination,
    ) -> ShopResult<Page<Product>>;

    async fn list_departments(&self) -> ShopResult<Vec<Department>>;

    async fn get_department(&self, department_id: i32) -> ShopResult<Option<Department>>;

    async fn list_categories(&self) -> ShopResult<Vec<Category>>;

    async fn list_shipping_regions(&self) -> ShopResult<Vec<ShippingRegion>>;

    async fn list_shipping_types(&self, shipping_region_id: i32) -> ShopResult<Vec<ShippingType>>;

    async fn get_shipping_type(&self, shipping_id: i32) -> ShopResult<Option<ShippingType>>;

    async fn get_shipping_region(
        &self,
        shipping_region_id: i32,
    ) -> ShopResult<Option<ShippingRegion>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Insert or merge a line (see [`CartItem::merge`]).
    ///
    /// Fails with `ProductNotFound` without writing when the product is
    /// missing.
    async fn upsert_item(&self, add: &AddCartItem) -> ShopResult<CartItem>;

    /// Lines of a cart ordered by item id
    async fn list_items(&self, cart_id: &CartId) -> ShopResult<Vec<CartItem>>;

    /// Lines joined with their current product data
    async fn list_lines(&self, cart_id: &CartId) -> ShopResult<Vec<CartLine>>;

    /// Remove every line; returns the number removed
    async fn clear(&self, cart_id: &CartId) -> ShopResult<u64>;

    /// Remove one line of one cart; returns the number removed
    async fn remove_item(&self, cart_id: &CartId, item_id: i32) -> ShopResult<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist header and line items in one transaction, applying `policy`
    /// to the source cart.
    async fn create_order(
        &self,
        draft: &OrderDraft,
        policy: DuplicateOrderPolicy,
    ) -> ShopResult<Order>;

    async fn find_summary(
        &self,
        order_id: i32,
        customer_id: i32,
    ) -> ShopResult<Option<OrderSummary>>;

    async fn list_for_customer(&self, customer_id: i32) -> ShopResult<Vec<Order>>;

    /// Unpaid order owned by `customer_id`
    async fn find_unpaid(&self, order_id: i32, customer_id: i32) -> ShopResult<Option<Order>>;

    /// Reserve an unpaid order for one capture attempt. `None` when the
    /// order is not unpaid, not owned by `customer_id`, or already held by
    /// a claim younger than [`CAPTURE_CLAIM_TTL_SECS`].
    async fn claim_for_capture(
        &self,
        order_id: i32,
        customer_id: i32,
        claim: &str,
    ) -> ShopResult<Option<Order>>;

    /// Drop `claim` after a failed attempt; no-op when it is not held
    async fn release_capture(&self, order_id: i32, claim: &str) -> ShopResult<()>;

    /// Mark an unpaid order paid and empty its source cart, in one
    /// transaction. Requires `claim` to still be held; `None` otherwise.
    async fn settle(
        &self,
        order_id: i32,
        customer_id: i32,
        claim: &str,
        charge_ref: &str,
    ) -> ShopResult<Option<Order>>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken
    async fn create_customer(&self, customer: &NewCustomer) -> ShopResult<Customer>;

    async fn find_by_email(&self, email: &str) -> ShopResult<Option<Customer>>;

    async fn find_by_id(&self, customer_id: i32) -> ShopResult<Option<Customer>>;

    async fn update_profile(
        &self,
        customer_id: i32,
        update: &ProfileUpdate,
    ) -> ShopResult<Option<Customer>>;

    async fn update_address(
        &self,
        customer_id: i32,
        update: &AddressUpdate,
    ) -> ShopResult<Option<Customer>>;

    async fn update_credit_card(
        &self,
        customer_id: i32,
        masked_card: &str,
    ) -> ShopResult<Option<Customer>>;

    async fn update_password(
        &self,
        customer_id: i32,
        password_hash: &str,
    ) -> ShopResult<Option<Customer>>;
}

/// Shared handles to every store, usually backed by one object
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub customers: Arc<dyn CustomerStore>,
}

impl Stores {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CatalogStore + CartStore + OrderStore + CustomerStore + 'static,
    {
        Self {
            catalog: backend.clone(),
            carts: backend.clone(),
            orders: backend.clone(),
            customers: backend,
        }
    }
}
