//! storefront-store — the persistence collaborator for coupons and orders.
//!
//! These traits define WHAT the stores do; implementations define HOW.
//! The in-memory [`memory`] module is the default backend; a document-store
//! backend would implement the same traits.
//!
//! Coupon redemption is deliberately a storage operation, not a pricing
//! one: `redeem` must apply its usage check and increment atomically, so a
//! burst of concurrent checkouts cannot race a coupon past `max_uses`.

pub mod memory;
pub mod order;

use storefront_pricing::Coupon;
use thiserror::Error;
use uuid::Uuid;

pub use memory::{MemoryCoupons, MemoryOrders};
pub use order::{Order, OrderItem, PaymentResult, ShippingAddress};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("coupon with code '{0}' already exists")]
    DuplicateCode(String),

    #[error("coupon '{0}' not found")]
    CouponNotFound(String),

    #[error("order '{0}' not found")]
    OrderNotFound(Uuid),

    #[error("coupon '{0}' has reached its maximum usage limit")]
    UsageExhausted(String),
}

/// Fields an admin may change on an existing coupon. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct CouponPatch {
    pub discount_type: Option<storefront_pricing::DiscountType>,
    pub discount_value: Option<rust_decimal::Decimal>,
    pub minimum_purchase: Option<rust_decimal::Decimal>,
    pub max_uses: Option<u32>,
    pub expires_at: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub is_active: Option<bool>,
}

pub trait CouponStore: Send + Sync {
    /// Insert a new coupon. The code must already be normalized.
    fn insert(&self, coupon: Coupon) -> Result<(), StoreError>;

    /// Look up by normalized code.
    fn get(&self, code: &str) -> Option<Coupon>;

    fn list(&self) -> Vec<Coupon>;

    fn update(&self, code: &str, patch: CouponPatch) -> Result<Coupon, StoreError>;

    fn delete(&self, code: &str) -> Result<(), StoreError>;

    /// Atomically redeem: increment `current_uses` only while under
    /// `max_uses` (0 = unlimited) and record the redeeming user. The check
    /// and the increment MUST happen under one lock or conditional update —
    /// this is where the concurrent-redemption race is closed.
    fn redeem(&self, code: &str, user_id: Uuid) -> Result<Coupon, StoreError>;
}

pub trait OrderStore: Send + Sync {
    fn insert(&self, order: Order) -> Result<(), StoreError>;

    fn get(&self, id: Uuid) -> Option<Order>;

    /// All orders, newest first.
    fn list(&self) -> Vec<Order>;

    /// Orders placed by one user, newest first.
    fn list_for_user(&self, user_id: Uuid) -> Vec<Order>;

    fn mark_paid(&self, id: Uuid, result: PaymentResult) -> Result<Order, StoreError>;

    fn mark_delivered(&self, id: Uuid) -> Result<Order, StoreError>;
}
