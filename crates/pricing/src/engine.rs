use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::policy::PricingPolicy;

// ---------------------------------------------------------------------------
// Order price composer.
//
// itemsPrice = Σ price × qty
// shipping   = 0 above the free-shipping threshold (strictly), else flat
// tax        = tax_rate × itemsPrice
// total      = max(0, items + shipping + tax − discount)
//
// Malformed line items are a hard validation error, never coerced to zero.
// Rounding happens once, at the output boundary.
// ---------------------------------------------------------------------------

/// One order line as the pricing core sees it. Ephemeral — product identity
/// and variants are the caller's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub price: Decimal,
    pub qty: u32,
}

/// The full price breakdown for an order. All fields rounded per policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
}

/// Validate line items and sum price × qty at full precision.
pub fn subtotal(items: &[LineItem]) -> Result<Decimal, PricingError> {
    let mut sum = Decimal::ZERO;
    for (index, item) in items.iter().enumerate() {
        if item.price < Decimal::ZERO {
            return Err(PricingError::NegativePrice {
                index,
                price: item.price,
            });
        }
        if item.qty == 0 {
            return Err(PricingError::ZeroQuantity { index });
        }
        sum += item.price * Decimal::from(item.qty);
    }
    Ok(sum)
}

/// Compose the chargeable total for an order.
///
/// `discount` is the amount already computed by [`crate::Coupon::discount_for`]
/// (or zero). An empty item list is a well-defined zero-valued result;
/// rejecting empty orders is the caller's policy.
pub fn compose(
    policy: &PricingPolicy,
    items: &[LineItem],
    discount: Decimal,
) -> Result<PriceBreakdown, PricingError> {
    let items_price = subtotal(items)?;

    let shipping_price = if items_price > policy.free_shipping_over {
        Decimal::ZERO
    } else {
        policy.shipping_flat
    };

    let tax_price = policy.tax_rate * items_price;

    let total = items_price + shipping_price + tax_price - discount;
    let total_price = total.max(Decimal::ZERO);

    Ok(PriceBreakdown {
        items_price: policy.round(items_price),
        shipping_price: policy.round(shipping_price),
        tax_price: policy.round(tax_price),
        discount_amount: policy.round(discount),
        total_price: policy.round(total_price),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
