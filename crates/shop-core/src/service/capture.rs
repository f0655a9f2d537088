//! Payment capture: charge an unpaid order and settle it.

use crate::error::{ShopError, ShopResult};
use crate::money::Currency;
use crate::order::Order;
use crate::payment::{BoxedPaymentProcessor, Charge, ChargeRequest};
use crate::store::OrderStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Result of a successful capture
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReceipt {
    pub order: Order,
    pub charge: Charge,
}

#[derive(Clone)]
pub struct CaptureService {
    orders: Arc<dyn OrderStore>,
    processor: BoxedPaymentProcessor,
    currency: Currency,
}

impl CaptureService {
    pub fn new(orders: Arc<dyn OrderStore>, processor: BoxedPaymentProcessor) -> Self {
        Self {
            orders,
            processor,
            currency: Currency::default(),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Charge the order total and mark the order paid.
    ///
    /// Only an unpaid order owned by `customer_id` can be captured; anything
    /// else is `OrderNotFound` and the processor is never called. The order
    /// is claimed before the processor is called, so an overlapping attempt
    /// gets `Conflict` instead of a second charge. When the processor fails
    /// the claim is dropped and the order stays unpaid with its cart intact.
    #[instrument(skip(self, email, payment_token), fields(provider = self.processor.provider_name()))]
    pub async fn capture_payment(
        &self,
        order_id: i32,
        customer_id: i32,
        email: &str,
        payment_token: &str,
    ) -> ShopResult<CaptureReceipt> {
        let claim = Uuid::new_v4().to_string();

        let Some(order) = self
            .orders
            .claim_for_capture(order_id, customer_id, &claim)
            .await?
        else {
            return Err(self.unclaimable(order_id, customer_id).await?);
        };

        let charge = match self.charge_order(&order, &claim, email, payment_token).await {
            Ok(charge) => charge,
            Err(e) => {
                if let Err(release) = self.orders.release_capture(order_id, &claim).await {
                    error!(error = %release, "could not release capture claim");
                }
                return Err(e);
            }
        };

        let Some(settled) = self
            .orders
            .settle(order_id, customer_id, &claim, &charge.charge_id)
            .await?
        else {
            // claim expired and another attempt settled the order
            error!(
                charge_id = %charge.charge_id,
                "order already settled, charge needs a manual refund"
            );
            return Err(ShopError::Conflict(format!(
                "order {order_id} was paid by another request"
            )));
        };

        info!(
            charge_id = %charge.charge_id,
            amount = %self.currency.from_minor_units(charge.amount_minor),
            "order paid"
        );

        Ok(CaptureReceipt {
            order: settled,
            charge,
        })
    }

    /// Why a claim was refused: in flight elsewhere, or not capturable at all
    async fn unclaimable(&self, order_id: i32, customer_id: i32) -> ShopResult<ShopError> {
        let in_flight = self
            .orders
            .find_unpaid(order_id, customer_id)
            .await?
            .is_some();

        Ok(if in_flight {
            ShopError::Conflict(format!("a payment for order {order_id} is already in progress"))
        } else {
            ShopError::OrderNotFound { order_id }
        })
    }

    async fn charge_order(
        &self,
        order: &Order,
        claim: &str,
        email: &str,
        payment_token: &str,
    ) -> ShopResult<Charge> {
        let amount_minor = self.currency.to_minor_units(order.total_amount)?;

        let payor_id = self
            .processor
            .create_customer(email, payment_token)
            .await
            .inspect_err(|e| warn!(error = %e, "payor creation failed"))?;

        let request = ChargeRequest {
            idempotency_key: Some(format!("order-{}-{claim}", order.order_id)),
            payor_id,
            amount_minor,
            currency: self.currency,
            description: order
                .comments
                .clone()
                .unwrap_or_else(|| format!("Order {}", order.order_id)),
        };

        self.processor
            .charge(&request)
            .await
            .inspect_err(|e| warn!(error = %e, "charge failed, order left unpaid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{AddCartItem, CartId};
    use crate::order::OrderStatus;
    use crate::service::testing::{customer, seeded_stores, FakeProcessor};
    use crate::service::{CartService, OrderService};
    use std::sync::atomic::Ordering;

    struct Fixture {
        carts: CartService,
        orders: OrderService,
        capture: CaptureService,
        processor: Arc<FakeProcessor>,
    }

    fn fixture() -> Fixture {
        let (_, stores) = seeded_stores();
        let processor = Arc::new(FakeProcessor::default());
        Fixture {
            carts: CartService::new(stores.carts.clone()),
            orders: OrderService::new(
                stores.catalog.clone(),
                stores.carts.clone(),
                stores.orders.clone(),
            ),
            capture: CaptureService::new(stores.orders.clone(), processor.clone()),
            processor,
        }
    }

    async fn order_for(fx: &Fixture, customer_id: i32) -> (CartId, Order) {
        let cart = CartId::generate();
        fx.carts
            .add_or_merge_item(AddCartItem::new(cart.clone(), 1).with_quantity(2))
            .await
            .unwrap();
        fx.carts
            .add_or_merge_item(AddCartItem::new(cart.clone(), 2).with_quantity(2))
            .await
            .unwrap();
        let order = fx
            .orders
            .create_order(&cart, 1, &customer(customer_id))
            .await
            .unwrap();
        (cart, order)
    }

    #[tokio::test]
    async fn test_capture_charges_total_and_settles() {
        let fx = fixture();
        let (cart, order) = order_for(&fx, 7).await;

        let receipt = fx
            .capture
            .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa")
            .await
            .unwrap();

        assert_eq!(receipt.charge.amount_minor, 4400);
        assert_eq!(receipt.order.status, OrderStatus::Paid);
        assert_eq!(
            receipt.order.settled_charge_ref.as_deref(),
            Some(receipt.charge.charge_id.as_str())
        );
        assert!(receipt.order.pending_cart_ref.is_none());
        assert!(fx.carts.list(&cart).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_capture_is_not_found() {
        let fx = fixture();
        let (_, order) = order_for(&fx, 7).await;

        fx.capture
            .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa")
            .await
            .unwrap();
        let err = fx
            .capture
            .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa")
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::OrderNotFound { .. }));
        assert_eq!(fx.processor.charge_count(), 1);
    }

    #[tokio::test]
    async fn test_foreign_order_never_reaches_processor() {
        let fx = fixture();
        let (_, order) = order_for(&fx, 7).await;

        let err = fx
            .capture
            .capture_payment(order.order_id, 8, "c8@mail.com", "tok_visa")
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::OrderNotFound { .. }));
        assert_eq!(fx.processor.customers.load(Ordering::SeqCst), 0);
        assert_eq!(fx.processor.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_declined_charge_leaves_order_unpaid() {
        let fx = fixture();
        let (cart, order) = order_for(&fx, 7).await;
        fx.processor.decline.store(true, Ordering::SeqCst);

        let err = fx
            .capture
            .capture_payment(order.order_id, 7, "c7@mail.com", "tok_chargeDeclined")
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::ProviderError { .. }));

        let summary = fx.orders.get_order_summary(order.order_id, 7).await.unwrap();
        assert_eq!(summary.order.status, OrderStatus::Unpaid);
        assert_eq!(fx.carts.list(&cart).await.unwrap().len(), 2);

        // retry with a working card succeeds
        fx.processor.decline.store(false, Ordering::SeqCst);
        fx.capture
            .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_overlapping_captures_charge_once() {
        let fx = fixture();
        let (cart, order) = order_for(&fx, 7).await;

        let (first, second) = tokio::join!(
            fx.capture
                .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa"),
            fx.capture
                .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa"),
        );
        let results = [first, second];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(ShopError::Conflict(_))))
                .count(),
            1
        );
        assert_eq!(fx.processor.charge_count(), 1);

        let summary = fx.orders.get_order_summary(order.order_id, 7).await.unwrap();
        assert_eq!(summary.order.status, OrderStatus::Paid);
        assert!(fx.carts.list(&cart).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_idempotency_key_is_per_attempt() {
        let fx = fixture();
        let (_, order) = order_for(&fx, 7).await;

        fx.capture
            .capture_payment(order.order_id, 7, "c7@mail.com", "tok_visa")
            .await
            .unwrap();

        let charges = fx.processor.charges.lock().unwrap();
        let key = charges[0].idempotency_key.as_deref().unwrap();
        assert!(key.starts_with(&format!("order-{}-", order.order_id)));
    }
}
