use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PricingError;

// ---------------------------------------------------------------------------
// Coupon — a discount offer.
//
// Eligibility is evaluated here, against an injected "now". Mutation
// (incrementing current_uses on redemption) belongs to the storage
// collaborator; this type never changes itself.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique code, stored uppercase.
    pub code: String,
    pub discount_type: DiscountType,
    /// Percentage points for `Percentage`, currency units for `Fixed`.
    pub discount_value: Decimal,
    /// Minimum order subtotal required. 0 = no minimum.
    #[serde(default)]
    pub minimum_purchase: Decimal,
    /// Total redemptions allowed across all users. 0 = unlimited.
    #[serde(default)]
    pub max_uses: u32,
    #[serde(default)]
    pub current_uses: u32,
    /// None = never expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Users who have redeemed this coupon. Recorded on redemption but not
    /// consulted by any eligibility rule.
    #[serde(default)]
    pub used_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Why a coupon may not be applied. First failing rule wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "reason")]
pub enum Rejection {
    Inactive,
    Expired,
    UsageLimitReached,
    BelowMinimum { minimum: Decimal },
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Expired => "EXPIRED",
            Self::UsageLimitReached => "USAGE_LIMIT_REACHED",
            Self::BelowMinimum { .. } => "BELOW_MINIMUM",
        }
    }

    /// User-facing text, matching the storefront's messages.
    pub fn message(&self) -> String {
        match self {
            Self::Inactive => "Coupon is inactive.".into(),
            Self::Expired => "Coupon has expired.".into(),
            Self::UsageLimitReached => {
                "Coupon has reached its maximum usage limit.".into()
            }
            Self::BelowMinimum { minimum } => {
                format!("Minimum purchase of ${minimum:.2} required.")
            }
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl Coupon {
    /// Canonical form of a code: trimmed, uppercase.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Structural validation of the record itself, used at admin
    /// create/update time. Eligibility is a separate question.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.code.trim().is_empty() {
            return Err(PricingError::EmptyCode);
        }
        if self.discount_value < Decimal::ZERO {
            return Err(PricingError::NegativeDiscountValue(self.discount_value));
        }
        if self.minimum_purchase < Decimal::ZERO {
            return Err(PricingError::NegativeMinimumPurchase(self.minimum_purchase));
        }
        Ok(())
    }

    /// May this coupon be applied to an order with the given subtotal?
    ///
    /// Rules short-circuit in order: inactive, expired, usage limit,
    /// minimum purchase. `user_id` is part of the signature for a future
    /// per-user rule; no current rule consults it. Pure — `now` is injected
    /// so evaluation is deterministic.
    pub fn evaluate(
        &self,
        subtotal: Decimal,
        _user_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        if !self.is_active {
            return Err(Rejection::Inactive);
        }
        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return Err(Rejection::Expired);
            }
        }
        if self.max_uses > 0 && self.current_uses >= self.max_uses {
            return Err(Rejection::UsageLimitReached);
        }
        if self.minimum_purchase > Decimal::ZERO && subtotal < self.minimum_purchase {
            return Err(Rejection::BelowMinimum {
                minimum: self.minimum_purchase,
            });
        }
        Ok(())
    }

    /// Discount this coupon grants on `subtotal`. Full precision — callers
    /// round at the output boundary only. A fixed discount is NOT capped at
    /// the subtotal; the composer clamps the final total at zero.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        match self.discount_type {
            DiscountType::Percentage => subtotal * self.discount_value / Decimal::from(100),
            DiscountType::Fixed => self.discount_value,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn coupon() -> Coupon {
        Coupon {
            code: "SAVE10".into(),
            discount_type: DiscountType::Percentage,
            discount_value: dec("10"),
            minimum_purchase: Decimal::ZERO,
            max_uses: 0,
            current_uses: 0,
            expires_at: None,
            is_active: true,
            used_by: vec![],
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn active_unexpired_under_limit_is_eligible() {
        assert_eq!(coupon().evaluate(dec("50"), None, now()), Ok(()));
    }

    #[test]
    fn inactive_wins_over_everything() {
        let mut c = coupon();
        c.is_active = false;
        c.expires_at = Some(now() - chrono::Duration::days(1));
        c.minimum_purchase = dec("1000");
        assert_eq!(c.evaluate(dec("1"), None, now()), Err(Rejection::Inactive));
    }

    #[test]
    fn expired_strictly_after() {
        let mut c = coupon();
        c.expires_at = Some(now());
        // now == expires_at is still valid
        assert_eq!(c.evaluate(dec("50"), None, now()), Ok(()));
        assert_eq!(
            c.evaluate(dec("50"), None, now() + chrono::Duration::seconds(1)),
            Err(Rejection::Expired)
        );
    }

    #[test]
    fn usage_limit_reached() {
        let mut c = coupon();
        c.max_uses = 3;
        c.current_uses = 3;
        assert_eq!(
            c.evaluate(dec("50"), None, now()),
            Err(Rejection::UsageLimitReached)
        );
        c.current_uses = 2;
        assert_eq!(c.evaluate(dec("50"), None, now()), Ok(()));
    }

    #[test]
    fn zero_max_uses_means_unlimited() {
        let mut c = coupon();
        c.max_uses = 0;
        c.current_uses = 1_000_000;
        assert_eq!(c.evaluate(dec("50"), None, now()), Ok(()));
    }

    #[test]
    fn below_minimum_carries_the_minimum() {
        let mut c = coupon();
        c.minimum_purchase = dec("75");
        assert_eq!(
            c.evaluate(dec("74.99"), None, now()),
            Err(Rejection::BelowMinimum { minimum: dec("75") })
        );
        // subtotal == minimum passes
        assert_eq!(c.evaluate(dec("75"), None, now()), Ok(()));
    }

    #[test]
    fn below_minimum_regardless_of_other_fields() {
        let mut c = coupon();
        c.minimum_purchase = dec("75");
        c.discount_type = DiscountType::Fixed;
        c.discount_value = dec("5");
        c.max_uses = 100;
        c.current_uses = 1;
        assert_eq!(
            c.evaluate(dec("10"), None, now()),
            Err(Rejection::BelowMinimum { minimum: dec("75") })
        );
    }

    #[test]
    fn percentage_discount() {
        let c = coupon();
        assert_eq!(c.discount_for(dec("200")), dec("20"));
    }

    #[test]
    fn fixed_discount_uncapped() {
        let mut c = coupon();
        c.discount_type = DiscountType::Fixed;
        c.discount_value = dec("15");
        // nominally exceeds the subtotal; the composer clamps downstream
        assert_eq!(c.discount_for(dec("5")), dec("15"));
    }

    #[test]
    fn percentage_keeps_full_precision() {
        let mut c = coupon();
        c.discount_value = dec("7.5");
        assert_eq!(c.discount_for(dec("19.99")), dec("1.499250"));
    }

    #[test]
    fn evaluate_is_idempotent() {
        let c = coupon();
        let t = now();
        assert_eq!(
            c.evaluate(dec("50"), None, t),
            c.evaluate(dec("50"), None, t)
        );
        assert_eq!(c.discount_for(dec("50")), c.discount_for(dec("50")));
    }

    #[test]
    fn code_normalization() {
        assert_eq!(Coupon::normalize_code("  save10 "), "SAVE10");
        assert_eq!(Coupon::normalize_code("FreeShip"), "FREESHIP");
    }

    #[test]
    fn rejection_messages_match_storefront() {
        assert_eq!(Rejection::Inactive.message(), "Coupon is inactive.");
        assert_eq!(
            Rejection::BelowMinimum { minimum: dec("50") }.message(),
            "Minimum purchase of $50.00 required."
        );
    }

    #[test]
    fn validate_rejects_bad_records() {
        let mut c = coupon();
        c.code = "  ".into();
        assert_eq!(c.validate(), Err(PricingError::EmptyCode));

        let mut c = coupon();
        c.discount_value = dec("-1");
        assert!(matches!(
            c.validate(),
            Err(PricingError::NegativeDiscountValue(_))
        ));
    }

    #[test]
    fn discount_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DiscountType::Percentage).unwrap(),
            "\"percentage\""
        );
        assert_eq!(serde_json::to_string(&DiscountType::Fixed).unwrap(), "\"fixed\"");
    }
}
