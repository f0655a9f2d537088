//! # Services
//!
//! Storefront operations composed from the store traits. Each service is
//! built once at startup from injected handles and shared across requests;
//! none of them keeps mutable state of its own.

pub mod account;
pub mod capture;
pub mod cart;
pub mod orders;

pub use account::{AccountService, AuthSession};
pub use capture::{CaptureReceipt, CaptureService};
pub use cart::CartService;
pub use orders::OrderService;
