use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_pricing::{engine, Coupon, DiscountType};
use storefront_store::CouponPatch;

use crate::error::ApiError;
use crate::identity::require_admin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Coupon routes.
//
// Admin CRUD plus the public apply endpoint. Apply is the eligibility
// evaluator + discount calculator over the submitted cart; it never mutates
// the coupon — redemption happens at order creation.
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponReq {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub minimum_purchase: Option<Decimal>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponReq {
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub minimum_purchase: Option<Decimal>,
    pub max_uses: Option<u32>,
    /// `null` clears the expiry; absent leaves it unchanged.
    #[serde(default, with = "serde_with_double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

/// Distinguishes an absent field from an explicit null.
mod serde_with_double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponReq {
    pub coupon_code: String,
    pub order_items: Vec<engine::LineItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponResp {
    pub valid: bool,
    pub message: String,
    pub coupon: AppliedCoupon,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/coupons", post(create_coupon).get(list_coupons))
        .route("/coupons/apply", post(apply_coupon))
        .route(
            "/coupons/:code",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
}

async fn create_coupon(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateCouponReq>,
) -> Result<(axum::http::StatusCode, Json<Coupon>), ApiError> {
    require_admin(&headers, "create coupons")?;

    let now = Utc::now();
    let coupon = Coupon {
        code: Coupon::normalize_code(&req.code),
        discount_type: req.discount_type,
        discount_value: req.discount_value,
        minimum_purchase: req.minimum_purchase.unwrap_or(Decimal::ZERO),
        max_uses: req.max_uses.unwrap_or(0),
        current_uses: 0,
        expires_at: req.expires_at,
        is_active: req.is_active.unwrap_or(true),
        used_by: vec![],
        created_at: now,
        updated_at: now,
    };
    coupon.validate()?;

    state.coupons.insert(coupon.clone())?;
    Ok((axum::http::StatusCode::CREATED, Json(coupon)))
}

async fn list_coupons(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    require_admin(&headers, "list coupons")?;
    Ok(Json(state.coupons.list()))
}

async fn get_coupon(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Coupon>, ApiError> {
    require_admin(&headers, "view coupons")?;
    let code = Coupon::normalize_code(&code);
    state
        .coupons
        .get(&code)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("coupon", &code))
}

async fn update_coupon(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateCouponReq>,
) -> Result<Json<Coupon>, ApiError> {
    require_admin(&headers, "update coupons")?;

    if let Some(v) = req.discount_value {
        if v < Decimal::ZERO {
            return Err(storefront_pricing::PricingError::NegativeDiscountValue(v).into());
        }
    }
    if let Some(v) = req.minimum_purchase {
        if v < Decimal::ZERO {
            return Err(storefront_pricing::PricingError::NegativeMinimumPurchase(v).into());
        }
    }

    let patch = CouponPatch {
        discount_type: req.discount_type,
        discount_value: req.discount_value,
        minimum_purchase: req.minimum_purchase,
        max_uses: req.max_uses,
        expires_at: req.expires_at,
        is_active: req.is_active,
    };
    let updated = state
        .coupons
        .update(&Coupon::normalize_code(&code), patch)?;
    Ok(Json(updated))
}

async fn delete_coupon(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&headers, "delete coupons")?;
    state.coupons.delete(&Coupon::normalize_code(&code))?;
    Ok(Json(serde_json::json!({ "message": "Coupon removed" })))
}

async fn apply_coupon(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApplyCouponReq>,
) -> Result<Json<ApplyCouponResp>, ApiError> {
    if req.order_items.is_empty() {
        return Err(ApiError::bad_request(
            "Coupon code and order items are required.",
            "Send couponCode plus a non-empty orderItems array of {price, qty}.",
        ));
    }

    let code = Coupon::normalize_code(&req.coupon_code);
    if code.is_empty() {
        return Err(storefront_pricing::PricingError::EmptyCode.into());
    }

    let coupon = state
        .coupons
        .get(&code)
        .ok_or_else(|| ApiError::not_found("coupon", &code))?;

    let subtotal = engine::subtotal(&req.order_items)?;
    coupon.evaluate(subtotal, None, Utc::now())?;
    let discount_amount = state.policy.round(coupon.discount_for(subtotal));

    tracing::info!(%code, %subtotal, %discount_amount, "coupon applied");

    Ok(Json(ApplyCouponResp {
        valid: true,
        message: "Coupon is valid.".into(),
        coupon: AppliedCoupon {
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            discount_amount,
        },
    }))
}
