use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_pricing::PriceBreakdown;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Order record — the persisted shape of a placed order.
//
// The breakdown is whatever the composer produced at submission time; it is
// computed server-side from the authoritative coupon and the submitted
// items, never taken from the client.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(flatten)]
    pub pricing: PriceBreakdown,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub is_paid: bool,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_result: Option<PaymentResult>,
    pub is_delivered: bool,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Reference into the product collaborator's records.
    pub product: Uuid,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: u32,
    /// Chosen variant, where the product has one.
    #[serde(default)]
    pub selected_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Details handed back by the payment gateway when an order is marked paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}
