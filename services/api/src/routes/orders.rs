use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use storefront_pricing::{engine, Coupon};
use storefront_store::{Order, OrderItem, PaymentResult, ShippingAddress};
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::{require_admin, require_user};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Order routes.
//
// Creation recomputes the whole price breakdown server-side from the
// authoritative coupon record and the submitted items; client-side totals
// are never trusted. Coupon redemption goes through the store's atomic
// conditional update.
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderReq {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Deserialize)]
pub struct PayOrderReq {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/mine", get(my_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/pay", put(pay_order))
        .route("/orders/:id/deliver", put(deliver_order))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderReq>,
) -> Result<(axum::http::StatusCode, Json<Order>), ApiError> {
    let ctx = require_user(&headers)?;

    if req.order_items.is_empty() {
        return Err(ApiError::bad_request(
            "No order items",
            "An order needs at least one line item.",
        ));
    }

    let line_items: Vec<engine::LineItem> = req
        .order_items
        .iter()
        .map(|i| engine::LineItem {
            price: i.price,
            qty: i.qty,
        })
        .collect();
    let subtotal = engine::subtotal(&line_items)?;

    // Recompute the discount from the stored coupon; then redeem atomically.
    let mut coupon_code = None;
    let mut discount = rust_decimal::Decimal::ZERO;
    if let Some(raw) = req.coupon_code.as_deref().filter(|c| !c.trim().is_empty()) {
        let code = Coupon::normalize_code(raw);
        let coupon = state
            .coupons
            .get(&code)
            .ok_or_else(|| ApiError::not_found("coupon", &code))?;
        coupon.evaluate(subtotal, Some(ctx.user_id), Utc::now())?;
        let redeemed = state.coupons.redeem(&code, ctx.user_id)?;
        discount = redeemed.discount_for(subtotal);
        coupon_code = Some(code);
    }

    let pricing = engine::compose(&state.policy, &line_items, discount)?;

    let order = Order {
        id: Uuid::now_v7(),
        user_id: ctx.user_id,
        order_items: req.order_items,
        shipping_address: req.shipping_address,
        payment_method: req.payment_method,
        pricing,
        coupon_code,
        is_paid: false,
        paid_at: None,
        payment_result: None,
        is_delivered: false,
        delivered_at: None,
        created_at: Utc::now(),
    };

    state.orders.insert(order.clone())?;
    tracing::info!(id = %order.id, total = %order.pricing.total_price, "order placed");
    Ok((axum::http::StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    require_admin(&headers, "list all orders")?;
    Ok(Json(state.orders.list()))
}

async fn my_orders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let ctx = require_user(&headers)?;
    Ok(Json(state.orders.list_for_user(ctx.user_id)))
}

async fn get_order(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let ctx = require_user(&headers)?;
    let order = state
        .orders
        .get(id)
        .ok_or_else(|| ApiError::not_found("order", &id.to_string()))?;

    if order.user_id != ctx.user_id && !ctx.is_admin() {
        return Err(ApiError::forbidden("view another user's order"));
    }
    Ok(Json(order))
}

async fn pay_order(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PayOrderReq>,
) -> Result<Json<Order>, ApiError> {
    require_admin(&headers, "mark orders paid")?;
    let order = state.orders.mark_paid(
        id,
        PaymentResult {
            id: req.id,
            status: req.status,
            update_time: req.update_time,
            email_address: req.email_address,
        },
    )?;
    Ok(Json(order))
}

async fn deliver_order(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    require_admin(&headers, "mark orders delivered")?;
    Ok(Json(state.orders.mark_delivered(id)?))
}
