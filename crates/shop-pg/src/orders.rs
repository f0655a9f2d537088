use async_trait::async_trait;
use shop_core::{
    CartId, DuplicateOrderPolicy, Order, OrderDetail, OrderDraft, OrderStatus, OrderStore,
    OrderSummary, ShopError, ShopResult, CAPTURE_CLAIM_TTL_SECS,
};
use tracing::debug;

use crate::{store_err, PgStore};

const ORDER_COLUMNS: &str = "order_id, customer_id, shipping_id, total_amount, status, comments, \
     pending_cart_ref, settled_charge_ref, created_on";

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(
        &self,
        draft: &OrderDraft,
        policy: DuplicateOrderPolicy,
    ) -> ShopResult<Order> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        if policy == DuplicateOrderPolicy::RejectPending {
            // serialize order creation per cart for the rest of the transaction
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(draft.cart_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;

            let pending: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM orders \
                 WHERE customer_id = $1 AND pending_cart_ref = $2 AND status = $3)",
            )
            .bind(draft.customer_id)
            .bind(&draft.cart_id)
            .bind(OrderStatus::Unpaid)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;

            if pending {
                return Err(ShopError::Conflict(format!(
                    "an unpaid order already exists for cart {}",
                    draft.cart_id
                )));
            }
        }

        let order: Order = sqlx::query_as(&format!(
            "INSERT INTO orders \
                 (customer_id, shipping_id, total_amount, status, comments, pending_cart_ref) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(draft.customer_id)
        .bind(draft.shipping_id)
        .bind(draft.totals.final_price)
        .bind(OrderStatus::Unpaid)
        .bind(&draft.comments)
        .bind(&draft.cart_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        for line in &draft.lines {
            sqlx::query(
                "INSERT INTO order_detail \
                     (order_id, product_id, product_name, attributes, quantity, unit_cost, unit_discount) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(order.order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(&line.attributes)
            .bind(line.quantity)
            .bind(line.unit_cost)
            .bind(line.unit_discount)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        if policy == DuplicateOrderPolicy::ClearCart {
            // only the priced items; anything added since stays in the cart
            let ordered: Vec<i32> = draft.lines.iter().map(|l| l.cart_item_id).collect();
            sqlx::query("DELETE FROM shopping_cart WHERE cart_id = $1 AND item_id = ANY($2)")
                .bind(&draft.cart_id)
                .bind(&ordered)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;
        Ok(order)
    }

    async fn find_summary(
        &self,
        order_id: i32,
        customer_id: i32,
    ) -> ShopResult<Option<OrderSummary>> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 AND customer_id = $2"
        ))
        .bind(order_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(order) = order else {
            return Ok(None);
        };

        let order_items: Vec<OrderDetail> = sqlx::query_as(
            "SELECT item_id, order_id, product_id, product_name, attributes, quantity, \
                    unit_cost, unit_discount \
             FROM order_detail WHERE order_id = $1 ORDER BY item_id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(Some(OrderSummary { order, order_items }))
    }

    async fn list_for_customer(&self, customer_id: i32) -> ShopResult<Vec<Order>> {
        sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY order_id"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn find_unpaid(&self, order_id: i32, customer_id: i32) -> ShopResult<Option<Order>> {
        sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE order_id = $1 AND customer_id = $2 AND status = $3"
        ))
        .bind(order_id)
        .bind(customer_id)
        .bind(OrderStatus::Unpaid)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn claim_for_capture(
        &self,
        order_id: i32,
        customer_id: i32,
        claim: &str,
    ) -> ShopResult<Option<Order>> {
        // single conditional update: concurrent claimers race on the row lock
        sqlx::query_as(&format!(
            "UPDATE orders \
             SET capture_claim = $1, capture_claimed_at = now() \
             WHERE order_id = $2 AND customer_id = $3 AND status = $4 \
               AND (capture_claim IS NULL \
                    OR capture_claimed_at < now() - make_interval(secs => $5)) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(claim)
        .bind(order_id)
        .bind(customer_id)
        .bind(OrderStatus::Unpaid)
        .bind(CAPTURE_CLAIM_TTL_SECS as f64)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn release_capture(&self, order_id: i32, claim: &str) -> ShopResult<()> {
        sqlx::query(
            "UPDATE orders SET capture_claim = NULL, capture_claimed_at = NULL \
             WHERE order_id = $1 AND capture_claim = $2",
        )
        .bind(order_id)
        .bind(claim)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn settle(
        &self,
        order_id: i32,
        customer_id: i32,
        claim: &str,
        charge_ref: &str,
    ) -> ShopResult<Option<Order>> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // row lock: a concurrent settle waits here, then sees status = paid
        let pending: Option<Option<CartId>> = sqlx::query_scalar(
            "SELECT pending_cart_ref FROM orders \
             WHERE order_id = $1 AND customer_id = $2 AND status = $3 \
               AND capture_claim = $4 \
             FOR UPDATE",
        )
        .bind(order_id)
        .bind(customer_id)
        .bind(OrderStatus::Unpaid)
        .bind(claim)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let Some(cart_ref) = pending else {
            return Ok(None);
        };

        let order: Order = sqlx::query_as(&format!(
            "UPDATE orders \
             SET status = $1, settled_charge_ref = $2, pending_cart_ref = NULL, \
                 capture_claim = NULL, capture_claimed_at = NULL \
             WHERE order_id = $3 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(OrderStatus::Paid)
        .bind(charge_ref)
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        if let Some(cart_id) = cart_ref {
            let cleared = sqlx::query("DELETE FROM shopping_cart WHERE cart_id = $1")
                .bind(&cart_id)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
            debug!(cart_id = %cart_id, removed = cleared.rows_affected(), "settled cart cleared");
        }

        tx.commit().await.map_err(store_err)?;
        Ok(Some(order))
    }
}
