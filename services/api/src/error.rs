use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_pricing::{PricingError, Rejection};
use storefront_store::StoreError;

// ---------------------------------------------------------------------------
// ApiError — the ONE canonical error shape for HTTP responses.
//
// Every library error converts into this via From impls, so clients always
// see { ok: false, error: { code, message, hint, status } }.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub hint: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
        status: u16,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: hint.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new("Err.Request.BadRequest", message, hint, 400)
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(
            "Err.NotFound",
            format!("{entity} '{id}' not found"),
            format!("Check that the {entity} identifier is correct."),
            404,
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(
            "Err.Auth.Unauthorized",
            "missing or invalid x-user-id header",
            "Authenticated routes require x-user-id: <uuid>. Token verification is handled upstream.",
            401,
        )
    }

    pub fn forbidden(action: &str) -> Self {
        Self::new(
            "Err.Auth.Forbidden",
            format!("admin role required to {action}"),
            "Include 'admin' in the x-roles header for this route.",
            403,
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} → {}", self.code, self.message, self.hint)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({
            "ok": false,
            "error": {
                "code": self.code,
                "message": self.message,
                "hint": self.hint,
                "status": self.status,
            }
        });
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Rejection → ApiError
// ---------------------------------------------------------------------------
impl From<Rejection> for ApiError {
    fn from(r: Rejection) -> Self {
        let hint = match &r {
            Rejection::Inactive => "An admin has deactivated this coupon.",
            Rejection::Expired => "The coupon's expiry date has passed.",
            Rejection::UsageLimitReached => {
                "The coupon's total usage limit has been exhausted."
            }
            Rejection::BelowMinimum { .. } => {
                "Add more items to reach the coupon's minimum purchase."
            }
        };
        ApiError::new("Err.Coupon.Ineligible", r.message(), hint, 400)
    }
}

// ---------------------------------------------------------------------------
// PricingError → ApiError
// ---------------------------------------------------------------------------
impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        let hint = match &e {
            PricingError::NegativePrice { .. } => {
                "Line item prices must be non-negative numbers."
            }
            PricingError::ZeroQuantity { .. } => {
                "Line item quantities must be positive integers."
            }
            PricingError::EmptyCode => "Provide a non-empty coupon code.",
            PricingError::NegativeDiscountValue(_) => {
                "discountValue must be >= 0 (percentage points or currency units)."
            }
            PricingError::NegativeMinimumPurchase(_) => "minimumPurchase must be >= 0.",
        };
        ApiError::new("Err.Pricing.Validation", e.to_string(), hint, 400)
    }
}

// ---------------------------------------------------------------------------
// StoreError → ApiError
// ---------------------------------------------------------------------------
impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::DuplicateCode(code) => ApiError::new(
                "Err.Coupon.Duplicate",
                e.to_string(),
                format!("A coupon with code '{code}' exists; pick another code or update it."),
                409,
            ),
            StoreError::CouponNotFound(code) => ApiError::not_found("coupon", code),
            StoreError::OrderNotFound(id) => ApiError::not_found("order", &id.to_string()),
            StoreError::UsageExhausted(_) => Rejection::UsageLimitReached.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
