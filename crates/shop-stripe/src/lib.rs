//! # shop-stripe
//!
//! Stripe payment processor for the shopmate storefront.
//!
//! Capture uses the classic token flow: the browser tokenizes the card
//! with Stripe.js, the server creates a Stripe customer from that token and
//! charges it the order total in minor units.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeChargeProcessor;
//! use shop_core::{CaptureService, PaymentProcessor};
//!
//! // Reads STRIPE_SECRET_KEY (and optionally STRIPE_API_BASE_URL)
//! let processor = Arc::new(StripeChargeProcessor::from_env()?);
//!
//! let capture = CaptureService::new(stores.orders.clone(), processor);
//! let receipt = capture.capture_payment(order_id, customer_id, email, "tok_visa").await?;
//! ```

pub mod charges;
pub mod config;

// Re-exports
pub use charges::StripeChargeProcessor;
pub use config::StripeConfig;
