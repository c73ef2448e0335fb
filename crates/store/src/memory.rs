use chrono::Utc;
use dashmap::DashMap;
use storefront_pricing::Coupon;
use uuid::Uuid;

use crate::order::{Order, PaymentResult};
use crate::{CouponPatch, CouponStore, OrderStore, StoreError};

// ---------------------------------------------------------------------------
// In-memory backend.
//
// Coupons keyed by normalized code, orders by id. DashMap's per-entry
// locking makes `redeem` a true conditional update: the usage check and the
// increment happen while the entry reference is held.
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCoupons {
    coupons: DashMap<String, Coupon>,
}

impl MemoryCoupons {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CouponStore for MemoryCoupons {
    fn insert(&self, coupon: Coupon) -> Result<(), StoreError> {
        match self.coupons.entry(coupon.code.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::DuplicateCode(coupon.code))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                tracing::info!(code = %coupon.code, "coupon created");
                slot.insert(coupon);
                Ok(())
            }
        }
    }

    fn get(&self, code: &str) -> Option<Coupon> {
        self.coupons.get(code).map(|c| c.clone())
    }

    fn list(&self) -> Vec<Coupon> {
        let mut all: Vec<Coupon> = self.coupons.iter().map(|c| c.clone()).collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }

    fn update(&self, code: &str, patch: CouponPatch) -> Result<Coupon, StoreError> {
        let mut entry = self
            .coupons
            .get_mut(code)
            .ok_or_else(|| StoreError::CouponNotFound(code.into()))?;

        let c = entry.value_mut();
        if let Some(v) = patch.discount_type {
            c.discount_type = v;
        }
        if let Some(v) = patch.discount_value {
            c.discount_value = v;
        }
        if let Some(v) = patch.minimum_purchase {
            c.minimum_purchase = v;
        }
        if let Some(v) = patch.max_uses {
            c.max_uses = v;
        }
        if let Some(v) = patch.expires_at {
            c.expires_at = v;
        }
        if let Some(v) = patch.is_active {
            c.is_active = v;
        }
        c.updated_at = Utc::now();
        Ok(c.clone())
    }

    fn delete(&self, code: &str) -> Result<(), StoreError> {
        self.coupons
            .remove(code)
            .map(|_| tracing::info!(code, "coupon deleted"))
            .ok_or_else(|| StoreError::CouponNotFound(code.into()))
    }

    fn redeem(&self, code: &str, user_id: Uuid) -> Result<Coupon, StoreError> {
        // get_mut holds the shard lock for the whole check-and-increment.
        let mut entry = self
            .coupons
            .get_mut(code)
            .ok_or_else(|| StoreError::CouponNotFound(code.into()))?;

        let c = entry.value_mut();
        if c.max_uses > 0 && c.current_uses >= c.max_uses {
            return Err(StoreError::UsageExhausted(code.into()));
        }
        c.current_uses += 1;
        if !c.used_by.contains(&user_id) {
            c.used_by.push(user_id);
        }
        c.updated_at = Utc::now();
        tracing::info!(code, uses = c.current_uses, "coupon redeemed");
        Ok(c.clone())
    }
}

#[derive(Default)]
pub struct MemoryOrders {
    orders: DashMap<Uuid, Order>,
}

impl MemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for MemoryOrders {
    fn insert(&self, order: Order) -> Result<(), StoreError> {
        tracing::info!(id = %order.id, user = %order.user_id, "order created");
        self.orders.insert(order.id, order);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).map(|o| o.clone())
    }

    fn list(&self) -> Vec<Order> {
        let mut all: Vec<Order> = self.orders.iter().map(|o| o.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    fn list_for_user(&self, user_id: Uuid) -> Vec<Order> {
        let mut mine: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .map(|o| o.clone())
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine
    }

    fn mark_paid(&self, id: Uuid, result: PaymentResult) -> Result<Order, StoreError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        let o = entry.value_mut();
        o.is_paid = true;
        o.paid_at = Some(Utc::now());
        o.payment_result = Some(result);
        Ok(o.clone())
    }

    fn mark_delivered(&self, id: Uuid) -> Result<Order, StoreError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        let o = entry.value_mut();
        o.is_delivered = true;
        o.delivered_at = Some(Utc::now());
        Ok(o.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderItem, ShippingAddress};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;
    use storefront_pricing::{DiscountType, PriceBreakdown};

    fn coupon(code: &str, max_uses: u32) -> Coupon {
        Coupon {
            code: code.into(),
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::from(5),
            minimum_purchase: Decimal::ZERO,
            max_uses,
            current_uses: 0,
            expires_at: None,
            is_active: true,
            used_by: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(user_id: Uuid, created_at: chrono::DateTime<Utc>) -> Order {
        Order {
            id: Uuid::now_v7(),
            user_id,
            order_items: vec![OrderItem {
                product: Uuid::new_v4(),
                name: "Tee".into(),
                image: "tee.jpg".into(),
                price: Decimal::from_str("19.99").unwrap(),
                qty: 1,
                selected_size: Some("M".into()),
            }],
            shipping_address: ShippingAddress {
                address: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
                country: "US".into(),
            },
            payment_method: "PayPal".into(),
            pricing: PriceBreakdown {
                items_price: Decimal::from_str("19.99").unwrap(),
                shipping_price: Decimal::from(10),
                tax_price: Decimal::from_str("3.00").unwrap(),
                discount_amount: Decimal::ZERO,
                total_price: Decimal::from_str("32.99").unwrap(),
            },
            coupon_code: None,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at,
        }
    }

    #[test]
    fn insert_rejects_duplicate_code() {
        let store = MemoryCoupons::new();
        store.insert(coupon("SAVE10", 0)).unwrap();
        assert_eq!(
            store.insert(coupon("SAVE10", 0)),
            Err(StoreError::DuplicateCode("SAVE10".into()))
        );
    }

    #[test]
    fn update_patches_only_supplied_fields() {
        let store = MemoryCoupons::new();
        store.insert(coupon("SAVE10", 3)).unwrap();
        let updated = store
            .update(
                "SAVE10",
                CouponPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.max_uses, 3);
        assert_eq!(updated.discount_value, Decimal::from(5));
    }

    #[test]
    fn redeem_increments_and_records_user() {
        let store = MemoryCoupons::new();
        store.insert(coupon("SAVE10", 0)).unwrap();
        let user = Uuid::new_v4();
        let c = store.redeem("SAVE10", user).unwrap();
        assert_eq!(c.current_uses, 1);
        assert_eq!(c.used_by, vec![user]);
        // same user again: counted, not duplicated in used_by
        let c = store.redeem("SAVE10", user).unwrap();
        assert_eq!(c.current_uses, 2);
        assert_eq!(c.used_by, vec![user]);
    }

    #[test]
    fn redeem_stops_at_max_uses() {
        let store = MemoryCoupons::new();
        store.insert(coupon("LIMITED", 2)).unwrap();
        store.redeem("LIMITED", Uuid::new_v4()).unwrap();
        store.redeem("LIMITED", Uuid::new_v4()).unwrap();
        assert_eq!(
            store.redeem("LIMITED", Uuid::new_v4()),
            Err(StoreError::UsageExhausted("LIMITED".into()))
        );
        assert_eq!(store.get("LIMITED").unwrap().current_uses, 2);
    }

    #[test]
    fn concurrent_redeem_cannot_race_past_limit() {
        let store = Arc::new(MemoryCoupons::new());
        store.insert(coupon("RACE", 50)).unwrap();

        let mut handles = vec![];
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                let mut won = 0u32;
                for _ in 0..20 {
                    if store.redeem("RACE", Uuid::new_v4()).is_ok() {
                        won += 1;
                    }
                }
                won
            }));
        }
        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(total, 50);
        assert_eq!(store.get("RACE").unwrap().current_uses, 50);
    }

    #[test]
    fn unknown_coupon_errors() {
        let store = MemoryCoupons::new();
        assert_eq!(
            store.redeem("NOPE", Uuid::new_v4()),
            Err(StoreError::CouponNotFound("NOPE".into()))
        );
        assert_eq!(
            store.delete("NOPE"),
            Err(StoreError::CouponNotFound("NOPE".into()))
        );
    }

    #[test]
    fn orders_listed_newest_first_per_user() {
        let store = MemoryOrders::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let t0 = Utc::now();
        let old = order(user, t0 - chrono::Duration::hours(1));
        let newer = order(user, t0);
        let theirs = order(other, t0);
        let (old_id, newer_id) = (old.id, newer.id);
        store.insert(old).unwrap();
        store.insert(newer).unwrap();
        store.insert(theirs).unwrap();

        let mine = store.list_for_user(user);
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newer_id);
        assert_eq!(mine[1].id, old_id);
        assert_eq!(store.list().len(), 3);
    }

    #[test]
    fn mark_paid_sets_result_and_timestamp() {
        let store = MemoryOrders::new();
        let o = order(Uuid::new_v4(), Utc::now());
        let id = o.id;
        store.insert(o).unwrap();

        let paid = store
            .mark_paid(
                id,
                PaymentResult {
                    id: "pay_123".into(),
                    status: "COMPLETED".into(),
                    update_time: "2025-06-01T12:00:00Z".into(),
                    email_address: "buyer@example.com".into(),
                },
            )
            .unwrap();
        assert!(paid.is_paid);
        assert!(paid.paid_at.is_some());
        assert_eq!(paid.payment_result.unwrap().id, "pay_123");

        let delivered = store.mark_delivered(id).unwrap();
        assert!(delivered.is_delivered);
        assert!(delivered.delivered_at.is_some());
    }

    #[test]
    fn mark_paid_unknown_order_errors() {
        let store = MemoryOrders::new();
        let id = Uuid::now_v7();
        assert!(matches!(
            store.mark_paid(
                id,
                PaymentResult {
                    id: "x".into(),
                    status: "x".into(),
                    update_time: "x".into(),
                    email_address: "x".into(),
                }
            ),
            Err(StoreError::OrderNotFound(_))
        ));
    }
}
