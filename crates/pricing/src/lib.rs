//! storefront-pricing — pure coupon eligibility and order pricing.
//!
//! Three cooperating pieces, leaves first:
//!   - discount calculation ([`Coupon::discount_for`])
//!   - coupon eligibility ([`Coupon::evaluate`], time injected)
//!   - order price composition ([`engine::compose`])
//!
//! No global state. No file IO. No clock reads. Pure evaluation — callers
//! supply the coupon record, the line items, the policy, and "now".

pub mod coupon;
pub mod engine;
pub mod error;
pub mod policy;

pub use coupon::{Coupon, DiscountType, Rejection};
pub use engine::{compose, subtotal, LineItem, PriceBreakdown};
pub use error::PricingError;
pub use policy::{PricingPolicy, Rounding};
