//! Cart operations: add/merge, list, clear, remove.

use crate::cart::{AddCartItem, CartId, CartItem};
use crate::error::{ShopError, ShopResult};
use crate::store::CartStore;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>) -> Self {
        Self { carts }
    }

    /// Add a product or merge it into an existing line, returning the cart.
    ///
    /// A repeat add without a quantity increments by one; an explicit
    /// quantity replaces the stored one.
    #[instrument(skip(self, add), fields(cart_id = %add.cart_id, product_id = add.product_id))]
    pub async fn add_or_merge_item(&self, add: AddCartItem) -> ShopResult<Vec<CartItem>> {
        if let Some(quantity) = add.quantity {
            if quantity < 1 {
                return Err(ShopError::ValidationFailed(
                    "quantity must be at least 1".to_string(),
                ));
            }
        }

        let item = self.carts.upsert_item(&add).await?;
        debug!(item_id = item.item_id, quantity = item.quantity, "cart line stored");

        self.carts.list_items(&add.cart_id).await
    }

    pub async fn list(&self, cart_id: &CartId) -> ShopResult<Vec<CartItem>> {
        self.carts.list_items(cart_id).await
    }

    /// Empty a cart. Clearing an empty or unknown cart is not an error.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn clear(&self, cart_id: &CartId) -> ShopResult<()> {
        let removed = self.carts.clear(cart_id).await?;
        debug!(removed, "cart cleared");
        Ok(())
    }

    /// Remove one line of a cart; idempotent.
    pub async fn remove_item(&self, cart_id: &CartId, item_id: i32) -> ShopResult<()> {
        self.carts.remove_item(cart_id, item_id).await?;
        Ok(())
    }
}
