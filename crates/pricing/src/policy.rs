use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pricing policy — the constants the composer applies.
//
// These are POLICY, not derived values: the shipping threshold/rate and the
// tax rate come from the business, so they live in config rather than code.
// Defaults match the observed storefront behavior.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Tax charged on the items subtotal (0.15 = 15%).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,

    /// Shipping is waived when the items subtotal is STRICTLY above this.
    #[serde(default = "default_free_shipping_over")]
    pub free_shipping_over: Decimal,

    /// Flat shipping charge at or below the threshold.
    #[serde(default = "default_shipping_flat")]
    pub shipping_flat: Decimal,

    #[serde(default = "default_rounding")]
    pub rounding: Rounding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rounding {
    /// Decimal places (typically 2)
    pub scale: u32,
    /// "bankers" | "half_up"
    pub mode: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            free_shipping_over: default_free_shipping_over(),
            shipping_flat: default_shipping_flat(),
            rounding: default_rounding(),
        }
    }
}

impl PricingPolicy {
    /// Load a policy from a YAML file. Missing fields take the defaults.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Round a monetary value per this policy. Applied only at the output
    /// boundary — intermediate arithmetic stays full precision. The result
    /// is rescaled so money always serializes with the policy's scale
    /// ("120.00", never "120").
    pub fn round(&self, v: Decimal) -> Decimal {
        use rust_decimal::RoundingStrategy;
        let mode = match self.rounding.mode.as_str() {
            "bankers" => RoundingStrategy::MidpointNearestEven,
            _ => RoundingStrategy::MidpointAwayFromZero,
        };
        let mut r = v.round_dp_with_strategy(self.rounding.scale, mode);
        r.rescale(self.rounding.scale);
        r
    }
}

fn default_tax_rate() -> Decimal {
    Decimal::new(15, 2) // 0.15
}

fn default_free_shipping_over() -> Decimal {
    Decimal::from(100)
}

fn default_shipping_flat() -> Decimal {
    Decimal::from(10)
}

fn default_rounding() -> Rounding {
    Rounding {
        scale: 2,
        mode: "half_up".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
