use std::sync::Arc;

use storefront_pricing::PricingPolicy;
use storefront_store::{CouponStore, MemoryCoupons, MemoryOrders, OrderStore};

// ---------------------------------------------------------------------------
// AppState — shared resources for the HTTP surface.
//
// Stores are trait objects so the backend is swappable; the pricing policy
// is loaded once at startup and never mutated.
// ---------------------------------------------------------------------------

pub struct AppState {
    pub policy: PricingPolicy,
    pub coupons: Arc<dyn CouponStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl AppState {
    /// Policy from PRICING_POLICY_PATH (YAML) when set, defaults otherwise.
    /// In-memory stores; a document-store backend would be wired here.
    pub fn from_env() -> anyhow::Result<Arc<Self>> {
        let policy = match std::env::var("PRICING_POLICY_PATH") {
            Ok(path) => {
                tracing::info!(%path, "loading pricing policy");
                PricingPolicy::from_yaml_file(&path)?
            }
            Err(_) => PricingPolicy::default(),
        };

        Ok(Arc::new(Self {
            policy,
            coupons: Arc::new(MemoryCoupons::new()),
            orders: Arc::new(MemoryOrders::new()),
        }))
    }

    /// State over explicit parts. Used by tests.
    pub fn with_stores(
        policy: PricingPolicy,
        coupons: Arc<dyn CouponStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            policy,
            coupons,
            orders,
        })
    }
}
