//! # Cart Types
//!
//! Shopping-cart lines keyed by an opaque, client-held cart identifier.
//! A cart is not bound to a customer; the same cart id can be used before
//! and after the customer authenticates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, URL-safe cart identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct CartId(String);

impl CartId {
    /// Generate a fresh cart id (UUID v4, hyphen-free hex)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CartId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CartId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CartItem {
    pub item_id: i32,
    pub cart_id: CartId,
    pub product_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    pub quantity: i32,
}

impl CartItem {
    /// Apply a repeat add of the same product.
    ///
    /// An explicit quantity replaces the stored one; without it the stored
    /// quantity goes up by one. Attributes change only when supplied.
    pub fn merge(&mut self, attributes: Option<String>, quantity: Option<i32>) {
        self.quantity = match quantity {
            Some(q) => q,
            None => self.quantity + 1,
        };
        if let Some(attrs) = attributes {
            self.attributes = Some(attrs);
        }
    }
}

/// Request to add (or merge) a product into a cart
#[derive(Debug, Clone, PartialEq)]
pub struct AddCartItem {
    pub cart_id: CartId,
    pub product_id: i32,
    pub attributes: Option<String>,
    /// Always >= 1 when present
    pub quantity: Option<i32>,
}

impl AddCartItem {
    pub fn new(cart_id: CartId, product_id: i32) -> Self {
        Self {
            cart_id,
            product_id,
            attributes: None,
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    /// Quantity for a first insert
    pub fn initial_quantity(&self) -> i32 {
        self.quantity.unwrap_or(1)
    }
}

/// Cart line joined with its live product, used for pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CartLine {
    pub item_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub attributes: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub discounted_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32) -> CartItem {
        CartItem {
            item_id: 1,
            cart_id: CartId::from("cart-a"),
            product_id: 10,
            attributes: Some("LG, Red".into()),
            quantity,
        }
    }

    #[test]
    fn test_generated_ids_are_url_safe_and_distinct() {
        let a = CartId::generate();
        let b = CartId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_merge_without_quantity_increments() {
        let mut line = item(3);
        line.merge(None, None);
        line.merge(None, None);
        assert_eq!(line.quantity, 5);
        assert_eq!(line.attributes.as_deref(), Some("LG, Red"));
    }

    #[test]
    fn test_merge_with_quantity_overwrites() {
        let mut line = item(3);
        line.merge(Some("S, Blue".into()), Some(7));
        assert_eq!(line.quantity, 7);
        assert_eq!(line.attributes.as_deref(), Some("S, Blue"));

        line.merge(None, Some(2));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_initial_quantity_defaults_to_one() {
        let add = AddCartItem::new(CartId::from("c"), 1);
        assert_eq!(add.initial_quantity(), 1);
        assert_eq!(add.with_quantity(4).initial_quantity(), 4);
    }
}
