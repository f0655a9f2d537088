//! Order materialization and order queries.

use crate::cart::CartId;
use crate::error::{ShopError, ShopResult};
use crate::order::{DraftLine, DuplicateOrderPolicy, Order, OrderDraft, OrderSummary, OrderTotals};
use crate::store::{CartStore, CatalogStore, OrderStore};
use crate::token::Identity;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct OrderService {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    policy: DuplicateOrderPolicy,
}

impl OrderService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            catalog,
            carts,
            orders,
            policy: DuplicateOrderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicateOrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicateOrderPolicy {
        self.policy
    }

    /// Turn the current contents of a cart into an unpaid order.
    ///
    /// Line items snapshot product name and prices as they are now; later
    /// catalog edits do not touch the order. An empty cart produces a
    /// shipping-only order.
    #[instrument(skip(self, customer), fields(cart_id = %cart_id, customer_id = customer.customer_id))]
    pub async fn create_order(
        &self,
        cart_id: &CartId,
        shipping_id: i32,
        customer: &Identity,
    ) -> ShopResult<Order> {
        let shipping = self
            .catalog
            .get_shipping_type(shipping_id)
            .await?
            .ok_or(ShopError::InvalidShipping { shipping_id })?;

        let lines = self.carts.list_lines(cart_id).await?;
        let totals = OrderTotals::compute(&lines, shipping.shipping_cost);

        let draft = OrderDraft {
            customer_id: customer.customer_id,
            shipping_id,
            cart_id: cart_id.clone(),
            totals,
            comments: String::new(),
            lines: lines.iter().map(DraftLine::from).collect(),
        };
        let draft = OrderDraft {
            comments: format!("{} item(s) ordered by {}", draft.item_count(), customer.name),
            ..draft
        };

        let order = self.orders.create_order(&draft, self.policy).await?;

        info!(
            order_id = order.order_id,
            total = %order.total_amount,
            lines = draft.lines.len(),
            "order created"
        );

        Ok(order)
    }

    /// Order with line items, visible only to its owner
    pub async fn get_order_summary(&self, order_id: i32, customer_id: i32) -> ShopResult<OrderSummary> {
        self.orders
            .find_summary(order_id, customer_id)
            .await?
            .ok_or(ShopError::OrderNotFound { order_id })
    }

    pub async fn get_customer_orders(&self, customer_id: i32) -> ShopResult<Vec<Order>> {
        self.orders.list_for_customer(customer_id).await
    }
}
