use rust_decimal::Decimal;
use thiserror::Error;

/// Errors the pricing core can signal. No partial results: a caller gets a
/// full breakdown or one of these.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("line item {index}: negative price {price}")]
    NegativePrice { index: usize, price: Decimal },

    #[error("line item {index}: quantity must be at least 1")]
    ZeroQuantity { index: usize },

    #[error("coupon code must not be empty")]
    EmptyCode,

    #[error("discount value must not be negative: {0}")]
    NegativeDiscountValue(Decimal),

    #[error("minimum purchase must not be negative: {0}")]
    NegativeMinimumPurchase(Decimal),
}
