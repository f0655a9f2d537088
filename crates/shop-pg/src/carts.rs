use async_trait::async_trait;
use shop_core::{AddCartItem, CartId, CartItem, CartLine, CartStore, ShopError, ShopResult};
use tracing::debug;

use crate::{store_err, PgStore};

// Explicit quantity replaces, otherwise +1; attributes only when supplied.
// Concurrent upserts on one (cart_id, product_id) serialize on the unique key.
const UPSERT_ITEM: &str = "\
    INSERT INTO shopping_cart (cart_id, product_id, attributes, quantity) \
    VALUES ($1, $2, $3, $4) \
    ON CONFLICT (cart_id, product_id) DO UPDATE SET \
        quantity = COALESCE($5, shopping_cart.quantity + 1), \
        attributes = COALESCE(EXCLUDED.attributes, shopping_cart.attributes) \
    RETURNING item_id, cart_id, product_id, attributes, quantity";

#[async_trait]
impl CartStore for PgStore {
    async fn upsert_item(&self, add: &AddCartItem) -> ShopResult<CartItem> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM product WHERE product_id = $1)")
                .bind(add.product_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?;
        if !exists {
            return Err(ShopError::ProductNotFound {
                product_id: add.product_id,
            });
        }

        let item: CartItem = sqlx::query_as(UPSERT_ITEM)
            .bind(&add.cart_id)
            .bind(add.product_id)
            .bind(&add.attributes)
            .bind(add.initial_quantity())
            .bind(add.quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(item)
    }

    async fn list_items(&self, cart_id: &CartId) -> ShopResult<Vec<CartItem>> {
        sqlx::query_as(
            "SELECT item_id, cart_id, product_id, attributes, quantity FROM shopping_cart \
             WHERE cart_id = $1 ORDER BY item_id",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn list_lines(&self, cart_id: &CartId) -> ShopResult<Vec<CartLine>> {
        sqlx::query_as(
            "SELECT sc.item_id, sc.product_id, p.name AS product_name, sc.attributes, \
                    sc.quantity, p.price, p.discounted_price \
             FROM shopping_cart sc \
             JOIN product p ON p.product_id = sc.product_id \
             WHERE sc.cart_id = $1 \
             ORDER BY sc.item_id",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn clear(&self, cart_id: &CartId) -> ShopResult<u64> {
        let result = sqlx::query("DELETE FROM shopping_cart WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        debug!(cart_id = %cart_id, removed = result.rows_affected(), "cart cleared");
        Ok(result.rows_affected())
    }

    async fn remove_item(&self, cart_id: &CartId, item_id: i32) -> ShopResult<u64> {
        let result = sqlx::query("DELETE FROM shopping_cart WHERE cart_id = $1 AND item_id = $2")
            .bind(cart_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected())
    }
}
