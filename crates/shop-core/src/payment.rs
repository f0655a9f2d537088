//! # Payment Processor Trait
//!
//! Strategy trait for external payment processors. Capture talks to the
//! processor only through this trait, so providers can be swapped (and
//! faked in tests) without touching the order flow.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │        PaymentProcessor (trait)           │
//! │  ├── create_customer(email, token)        │
//! │  ├── charge(ChargeRequest)                │
//! │  └── provider_name()                      │
//! └───────────────────────────────────────────┘
//!                     ▲
//!          ┌──────────┴──────────┐
//!  ┌───────┴────────┐   ┌────────┴───────┐
//!  │ StripeCharges  │   │ test doubles   │
//!  └────────────────┘   └────────────────┘
//! ```

use crate::error::ShopResult;
use crate::money::Currency;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Amount and context of a single charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    /// Processor-side customer created for this payment
    pub payor_id: String,
    /// Amount in the currency's minor unit
    pub amount_minor: i64,
    pub currency: Currency,
    pub description: String,
    /// Prevents a retried request from charging twice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// A completed charge as reported by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub charge_id: String,
    pub provider: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

/// Core trait for payment processor implementations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Register the payer with the processor, returning its payor id.
    ///
    /// # Arguments
    /// * `email` - Payer's email
    /// * `payment_token` - Client-side tokenized card / payment method
    async fn create_customer(&self, email: &str, payment_token: &str) -> ShopResult<String>;

    /// Charge a previously registered payor.
    async fn charge(&self, request: &ChargeRequest) -> ShopResult<Charge>;

    /// Get the provider name (for logging and responses).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
