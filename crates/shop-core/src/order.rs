//! # Order Types
//!
//! Orders, order line snapshots and the pricing rule that turns a cart into
//! an order total.

use crate::cart::{CartId, CartLine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Payment status of an order. Only ever moves from `Unpaid` to `Paid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[repr(i16)]
pub enum OrderStatus {
    #[default]
    Unpaid = 0,
    Paid = 1,
}

impl OrderStatus {
    pub fn code(&self) -> i16 {
        *self as i16
    }
}

/// Order header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    pub order_id: i32,
    pub customer_id: i32,
    pub shipping_id: i32,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Source cart, set while the order is unpaid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_cart_ref: Option<CartId>,
    /// Processor charge id, set once paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_charge_ref: Option<String>,
    pub created_on: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }
}

/// Line item snapshot taken at materialization time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderDetail {
    pub item_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub unit_discount: Decimal,
}

/// Order header together with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderDetail>,
}

/// Order line before it has ids
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    /// Cart item this line was priced from
    pub cart_item_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub attributes: Option<String>,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub unit_discount: Decimal,
}

impl From<&CartLine> for DraftLine {
    fn from(line: &CartLine) -> Self {
        Self {
            cart_item_id: line.item_id,
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            attributes: line.attributes.clone(),
            quantity: line.quantity,
            unit_cost: line.price,
            unit_discount: line.discounted_price,
        }
    }
}

/// Everything needed to persist an order in one write
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: i32,
    pub shipping_id: i32,
    pub cart_id: CartId,
    pub totals: OrderTotals,
    pub comments: String,
    pub lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn item_count(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Priced totals of a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub total_price: Decimal,
    pub total_discount: Decimal,
    pub shipping_cost: Decimal,
    pub final_price: Decimal,
}

impl OrderTotals {
    /// `final = Σ(qty × price) + shipping − Σ(qty × discounted_price)`
    pub fn compute(lines: &[CartLine], shipping_cost: Decimal) -> Self {
        let (total_price, total_discount) =
            lines
                .iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(price, discount), line| {
                    let qty = Decimal::from(line.quantity);
                    (
                        price + qty * line.price,
                        discount + qty * line.discounted_price,
                    )
                });

        Self {
            total_price,
            total_discount,
            shipping_cost,
            final_price: total_price + shipping_cost - total_discount,
        }
    }
}

/// What happens to a cart that already produced an unpaid order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateOrderPolicy {
    /// Leave the cart in place; a second order can be created from it
    #[default]
    Allow,
    /// Empty the cart in the same write that creates the order
    ClearCart,
    /// Refuse while an unpaid order for the same cart and customer exists
    RejectPending,
}

impl FromStr for DuplicateOrderPolicy {
    type Err = crate::error::ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Self::Allow),
            "clear_cart" => Ok(Self::ClearCart),
            "reject_pending" => Ok(Self::RejectPending),
            other => Err(crate::error::ShopError::Configuration(format!(
                "unknown duplicate order policy: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(item_id: i32, qty: i32, price: Decimal, discount: Decimal) -> CartLine {
        CartLine {
            item_id,
            product_id: item_id,
            product_name: format!("Product {item_id}"),
            attributes: None,
            quantity: qty,
            price,
            discounted_price: discount,
        }
    }

    #[test]
    fn test_totals_with_discounts() {
        let lines = vec![
            line(1, 2, dec!(10.00), dec!(0.00)),
            line(2, 2, dec!(8.00), dec!(6.00)),
        ];
        let totals = OrderTotals::compute(&lines, dec!(20.00));

        assert_eq!(totals.total_price, dec!(36.00));
        assert_eq!(totals.total_discount, dec!(12.00));
        // 36.00 + 20.00 - 12.00
        assert_eq!(totals.final_price, dec!(44.00));
    }

    #[test]
    fn test_totals_do_not_drift() {
        let lines = vec![
            line(1, 3, dec!(0.10), dec!(0.00)),
            line(2, 7, dec!(19.99), dec!(0.01)),
        ];
        let totals = OrderTotals::compute(&lines, dec!(0.20));

        assert_eq!(totals.total_price, dec!(140.23));
        assert_eq!(totals.final_price, dec!(140.36));
    }

    #[test]
    fn test_empty_cart_costs_shipping_only() {
        let totals = OrderTotals::compute(&[], dec!(5.00));
        assert_eq!(totals.final_price, dec!(5.00));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderStatus::Unpaid.code(), 0);
        assert_eq!(OrderStatus::Paid.code(), 1);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "reject_pending".parse::<DuplicateOrderPolicy>().unwrap(),
            DuplicateOrderPolicy::RejectPending
        );
        assert!("sometimes".parse::<DuplicateOrderPolicy>().is_err());
    }
}
