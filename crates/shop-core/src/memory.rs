//! # In-Memory Store
//!
//! Implements every store trait over maps behind one async mutex. Each trait
//! method takes the lock once, so multi-row writes are atomic with respect to
//! every other caller. Used for development (no `DATABASE_URL`) and tests.

use crate::cart::{AddCartItem, CartId, CartItem, CartLine};
use crate::catalog::{
    CatalogSeed, Category, Department, Product, ProductCategory, ShippingRegion, ShippingType,
};
use crate::customer::{AddressUpdate, Customer, NewCustomer, ProfileUpdate};
use crate::error::{ShopError, ShopResult};
use crate::order::{
    DuplicateOrderPolicy, Order, OrderDetail, OrderDraft, OrderStatus, OrderSummary,
};
use crate::pagination::{Page, Pagination};
use crate::store::{CartStore, CatalogStore, CustomerStore, OrderStore, CAPTURE_CLAIM_TTL_SECS};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<i32, Product>,
    departments: BTreeMap<i32, Department>,
    categories: BTreeMap<i32, Category>,
    product_categories: Vec<ProductCategory>,
    shipping_regions: BTreeMap<i32, ShippingRegion>,
    shipping_types: BTreeMap<i32, ShippingType>,

    cart_items: BTreeMap<i32, CartItem>,
    orders: BTreeMap<i32, Order>,
    order_details: Vec<OrderDetail>,
    customers: BTreeMap<i32, Customer>,
    /// order id -> (claim, taken at)
    capture_claims: BTreeMap<i32, (String, DateTime<Utc>)>,

    next_item_id: i32,
    next_order_id: i32,
    next_detail_id: i32,
    next_customer_id: i32,
}

impl State {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    fn page_of<'a>(products: impl Iterator<Item = &'a Product>, page: Pagination) -> Page<Product> {
        let matching: Vec<&Product> = products.collect();
        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();
        Page { rows, total }
    }

    fn category_ids_of(&self, product_id: i32) -> impl Iterator<Item = i32> + '_ {
        self.product_categories
            .iter()
            .filter(move |pc| pc.product_id == product_id)
            .map(|pc| pc.category_id)
    }

    fn cart_lines(&self, cart_id: &CartId) -> Vec<CartLine> {
        self.cart_items
            .values()
            .filter(|item| &item.cart_id == cart_id)
            .filter_map(|item| {
                self.products.get(&item.product_id).map(|p| CartLine {
                    item_id: item.item_id,
                    product_id: p.product_id,
                    product_name: p.name.clone(),
                    attributes: item.attributes.clone(),
                    quantity: item.quantity,
                    price: p.price,
                    discounted_price: p.discounted_price,
                })
            })
            .collect()
    }

    fn clear_cart(&mut self, cart_id: &CartId) -> u64 {
        let before = self.cart_items.len();
        self.cart_items.retain(|_, item| &item.cart_id != cart_id);
        (before - self.cart_items.len()) as u64
    }

    fn update_customer<F>(&mut self, customer_id: i32, apply: F) -> Option<Customer>
    where
        F: FnOnce(&mut Customer),
    {
        let customer = self.customers.get_mut(&customer_id)?;
        apply(customer);
        Some(customer.clone())
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with catalog data
    pub fn with_catalog(seed: CatalogSeed) -> Self {
        let mut state = State::default();
        state.products = seed.products.into_iter().map(|p| (p.product_id, p)).collect();
        state.departments = seed
            .departments
            .into_iter()
            .map(|d| (d.department_id, d))
            .collect();
        state.categories = seed
            .categories
            .into_iter()
            .map(|c| (c.category_id, c))
            .collect();
        state.product_categories = seed.product_categories;
        state.shipping_regions = seed
            .shipping_regions
            .into_iter()
            .map(|r| (r.shipping_region_id, r))
            .collect();
        state.shipping_types = seed
            .shipping_types
            .into_iter()
            .map(|s| (s.shipping_id, s))
            .collect();

        Self {
            state: Mutex::new(state),
        }
    }

    /// Replace a product's live data (catalog edits happen outside the storefront)
    pub async fn put_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.products.insert(product.product_id, product);
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_product(&self, product_id: i32) -> ShopResult<Option<Product>> {
        Ok(self.state.lock().await.products.get(&product_id).cloned())
    }

    async fn list_products(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> ShopResult<Page<Product>> {
        let state = self.state.lock().await;
        let products = state
            .products
            .values()
            .filter(|p| search.map_or(true, |s| p.matches(s)));
        Ok(State::page_of(products, page))
    }

    async fn list_products_in_category(
        &self,
        category_id: i32,
        page: Pagination,
    ) -> ShopResult<Page<Product>> {
        let state = self.state.lock().await;
        let products = state
            .products
            .values()
            .filter(|p| state.category_ids_of(p.product_id).any(|c| c == category_id));
        Ok(State::page_of(products, page))
    }

    async fn list_products_in_department(
        &self,
        department_id: i32,
        page: Pagination,
    ) -> ShopResult<Page<Product>> {
        let state = self.state.lock().await;
        let products = state.products.values().filter(|p| {
            state.category_ids_of(p.product_id).any(|c| {
                state
                    .categories
                    .get(&c)
                    .is_some_and(|cat| cat.department_id == department_id)
            })
        });
        Ok(State::page_of(products, page))
    }

    async fn list_departments(&self) -> ShopResult<Vec<Department>> {
        Ok(self.state.lock().await.departments.values().cloned().collect())
    }

    async fn get_department(&self, department_id: i32) -> ShopResult<Option<Department>> {
        Ok(self.state.lock().await.departments.get(&department_id).cloned())
    }

    async fn list_categories(&self) -> ShopResult<Vec<Category>> {
        Ok(self.state.lock().await.categories.values().cloned().collect())
    }

    async fn list_shipping_regions(&self) -> ShopResult<Vec<ShippingRegion>> {
        Ok(self
            .state
            .lock()
            .await
            .shipping_regions
            .values()
            .cloned()
            .collect())
    }

    async fn list_shipping_types(&self, shipping_region_id: i32) -> ShopResult<Vec<ShippingType>> {
        Ok(self
            .state
            .lock()
            .await
            .shipping_types
            .values()
            .filter(|s| s.shipping_region_id == shipping_region_id)
            .cloned()
            .collect())
    }

    async fn get_shipping_type(&self, shipping_id: i32) -> ShopResult<Option<ShippingType>> {
        Ok(self.state.lock().await.shipping_types.get(&shipping_id).cloned())
    }

    async fn get_shipping_region(
        &self,
        shipping_region_id: i32,
    ) -> ShopResult<Option<ShippingRegion>> {
        Ok(self
            .state
            .lock()
            .await
            .shipping_regions
            .get(&shipping_region_id)
            .cloned())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn upsert_item(&self, add: &AddCartItem) -> ShopResult<CartItem> {
        let mut state = self.state.lock().await;
        if !state.products.contains_key(&add.product_id) {
            return Err(ShopError::ProductNotFound {
                product_id: add.product_id,
            });
        }

        let existing = state
            .cart_items
            .values_mut()
            .find(|item| item.cart_id == add.cart_id && item.product_id == add.product_id);

        if let Some(item) = existing {
            item.merge(add.attributes.clone(), add.quantity);
            return Ok(item.clone());
        }

        let item = CartItem {
            item_id: State::next_id(&mut state.next_item_id),
            cart_id: add.cart_id.clone(),
            product_id: add.product_id,
            attributes: add.attributes.clone(),
            quantity: add.initial_quantity(),
        };
        state.cart_items.insert(item.item_id, item.clone());
        Ok(item)
    }

    async fn list_items(&self, cart_id: &CartId) -> ShopResult<Vec<CartItem>> {
        Ok(self
            .state
            .lock()
            .await
            .cart_items
            .values()
            .filter(|item| &item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn list_lines(&self, cart_id: &CartId) -> ShopResult<Vec<CartLine>> {
        Ok(self.state.lock().await.cart_lines(cart_id))
    }

    async fn clear(&self, cart_id: &CartId) -> ShopResult<u64> {
        Ok(self.state.lock().await.clear_cart(cart_id))
    }

    async fn remove_item(&self, cart_id: &CartId, item_id: i32) -> ShopResult<u64> {
        let mut state = self.state.lock().await;
        let owned = state
            .cart_items
            .get(&item_id)
            .is_some_and(|item| &item.cart_id == cart_id);
        if owned {
            state.cart_items.remove(&item_id);
            return Ok(1);
        }
        Ok(0)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(
        &self,
        draft: &OrderDraft,
        policy: DuplicateOrderPolicy,
    ) -> ShopResult<Order> {
        let mut state = self.state.lock().await;

        if policy == DuplicateOrderPolicy::RejectPending {
            let pending = state.orders.values().any(|o| {
                o.customer_id == draft.customer_id
                    && o.status == OrderStatus::Unpaid
                    && o.pending_cart_ref.as_ref() == Some(&draft.cart_id)
            });
            if pending {
                return Err(ShopError::Conflict(format!(
                    "an unpaid order already exists for cart {}",
                    draft.cart_id
                )));
            }
        }

        let order = Order {
            order_id: State::next_id(&mut state.next_order_id),
            customer_id: draft.customer_id,
            shipping_id: draft.shipping_id,
            total_amount: draft.totals.final_price,
            status: OrderStatus::Unpaid,
            comments: Some(draft.comments.clone()),
            pending_cart_ref: Some(draft.cart_id.clone()),
            settled_charge_ref: None,
            created_on: Utc::now(),
        };

        for line in &draft.lines {
            let detail = OrderDetail {
                item_id: State::next_id(&mut state.next_detail_id),
                order_id: order.order_id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                attributes: line.attributes.clone(),
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                unit_discount: line.unit_discount,
            };
            state.order_details.push(detail);
        }

        if policy == DuplicateOrderPolicy::ClearCart {
            // only what was priced; items added meanwhile stay in the cart
            let ordered: Vec<i32> = draft.lines.iter().map(|l| l.cart_item_id).collect();
            state
                .cart_items
                .retain(|id, item| item.cart_id != draft.cart_id || !ordered.contains(id));
        }

        state.orders.insert(order.order_id, order.clone());
        Ok(order)
    }

    async fn find_summary(
        &self,
        order_id: i32,
        customer_id: i32,
    ) -> ShopResult<Option<OrderSummary>> {
        let state = self.state.lock().await;
        let Some(order) = state
            .orders
            .get(&order_id)
            .filter(|o| o.customer_id == customer_id)
        else {
            return Ok(None);
        };

        let order_items = state
            .order_details
            .iter()
            .filter(|d| d.order_id == order_id)
            .cloned()
            .collect();

        Ok(Some(OrderSummary {
            order: order.clone(),
            order_items,
        }))
    }

    async fn list_for_customer(&self, customer_id: i32) -> ShopResult<Vec<Order>> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn find_unpaid(&self, order_id: i32, customer_id: i32) -> ShopResult<Option<Order>> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .get(&order_id)
            .filter(|o| o.customer_id == customer_id && o.status == OrderStatus::Unpaid)
            .cloned())
    }

    async fn claim_for_capture(
        &self,
        order_id: i32,
        customer_id: i32,
        claim: &str,
    ) -> ShopResult<Option<Order>> {
        let mut state = self.state.lock().await;
        let Some(order) = state
            .orders
            .get(&order_id)
            .filter(|o| o.customer_id == customer_id && o.status == OrderStatus::Unpaid)
            .cloned()
        else {
            return Ok(None);
        };

        let now = Utc::now();
        let held = state
            .capture_claims
            .get(&order_id)
            .is_some_and(|(_, at)| now - *at < Duration::seconds(CAPTURE_CLAIM_TTL_SECS));
        if held {
            return Ok(None);
        }

        state
            .capture_claims
            .insert(order_id, (claim.to_string(), now));
        Ok(Some(order))
    }

    async fn release_capture(&self, order_id: i32, claim: &str) -> ShopResult<()> {
        let mut state = self.state.lock().await;
        if state
            .capture_claims
            .get(&order_id)
            .is_some_and(|(held, _)| held == claim)
        {
            state.capture_claims.remove(&order_id);
        }
        Ok(())
    }

    async fn settle(
        &self,
        order_id: i32,
        customer_id: i32,
        claim: &str,
        charge_ref: &str,
    ) -> ShopResult<Option<Order>> {
        let mut state = self.state.lock().await;
        let claimed = state
            .capture_claims
            .get(&order_id)
            .is_some_and(|(held, _)| held == claim);
        if !claimed {
            return Ok(None);
        }

        let Some(order) = state
            .orders
            .get_mut(&order_id)
            .filter(|o| o.customer_id == customer_id && o.status == OrderStatus::Unpaid)
        else {
            return Ok(None);
        };

        order.status = OrderStatus::Paid;
        order.settled_charge_ref = Some(charge_ref.to_string());
        let cart = order.pending_cart_ref.take();
        let settled = order.clone();
        state.capture_claims.remove(&order_id);

        if let Some(cart_id) = cart {
            state.clear_cart(&cart_id);
        }
        Ok(Some(settled))
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn create_customer(&self, customer: &NewCustomer) -> ShopResult<Customer> {
        let mut state = self.state.lock().await;
        let taken = state
            .customers
            .values()
            .any(|c| c.email.eq_ignore_ascii_case(&customer.email));
        if taken {
            return Err(ShopError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let created = Customer {
            customer_id: State::next_id(&mut state.next_customer_id),
            name: customer.name.clone(),
            email: customer.email.clone(),
            password_hash: customer.password_hash.clone(),
            credit_card: None,
            address_1: None,
            address_2: None,
            city: None,
            region: None,
            postal_code: None,
            country: None,
            shipping_region_id: 1,
            day_phone: None,
            eve_phone: None,
            mob_phone: None,
        };
        state.customers.insert(created.customer_id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> ShopResult<Option<Customer>> {
        Ok(self
            .state
            .lock()
            .await
            .customers
            .values()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, customer_id: i32) -> ShopResult<Option<Customer>> {
        Ok(self.state.lock().await.customers.get(&customer_id).cloned())
    }

    async fn update_profile(
        &self,
        customer_id: i32,
        update: &ProfileUpdate,
    ) -> ShopResult<Option<Customer>> {
        let mut state = self.state.lock().await;
        Ok(state.update_customer(customer_id, |c| {
            c.name = update.name.clone();
            c.day_phone = update.day_phone.clone();
            c.eve_phone = update.eve_phone.clone();
            c.mob_phone = update.mob_phone.clone();
        }))
    }

    async fn update_address(
        &self,
        customer_id: i32,
        update: &AddressUpdate,
    ) -> ShopResult<Option<Customer>> {
        let mut state = self.state.lock().await;
        Ok(state.update_customer(customer_id, |c| {
            c.address_1 = Some(update.address_1.clone());
            c.address_2 = update.address_2.clone();
            c.city = Some(update.city.clone());
            c.region = Some(update.region.clone());
            c.postal_code = Some(update.postal_code.clone());
            c.country = Some(update.country.clone());
            c.shipping_region_id = update.shipping_region_id;
        }))
    }

    async fn update_credit_card(
        &self,
        customer_id: i32,
        masked_card: &str,
    ) -> ShopResult<Option<Customer>> {
        let mut state = self.state.lock().await;
        Ok(state.update_customer(customer_id, |c| {
            c.credit_card = Some(masked_card.to_string());
        }))
    }

    async fn update_password(
        &self,
        customer_id: i32,
        password_hash: &str,
    ) -> ShopResult<Option<Customer>> {
        let mut state = self.state.lock().await;
        Ok(state.update_customer(customer_id, |c| {
            c.password_hash = password_hash.to_string();
        }))
    }
}
