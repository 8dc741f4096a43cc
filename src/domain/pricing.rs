//! Cart pricing: subtotal, tiered shipping, flat-rate tax and total.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::Serialize;

use super::cart::Cart;

/// Rounds a money amount to cents, half away from zero.
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Shipping and tax constants.
///
/// Below `free_shipping_threshold` shipping starts at `base_shipping` and is
/// reduced linearly by up to `shipping_discount_factor` as the subtotal
/// approaches the threshold, never dropping under `min_shipping`.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub free_shipping_threshold: BigDecimal,
    pub base_shipping: BigDecimal,
    pub min_shipping: BigDecimal,
    pub shipping_discount_factor: BigDecimal,
    pub tax_rate: BigDecimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: BigDecimal::from(80),
            base_shipping: BigDecimal::from(15),
            min_shipping: BigDecimal::from(8),
            shipping_discount_factor: decimal("0.3"),
            tax_rate: decimal("0.10"),
        }
    }
}

fn decimal(s: &str) -> BigDecimal {
    // Only called with literals above.
    BigDecimal::from_str(s).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping: BigDecimal,
    pub total: BigDecimal,
}

impl PricingConfig {
    pub fn shipping_for(&self, subtotal: &BigDecimal) -> BigDecimal {
        let zero = BigDecimal::from(0);
        if *subtotal <= zero || *subtotal >= self.free_shipping_threshold {
            return round_money(&zero);
        }

        let progress = subtotal / &self.free_shipping_threshold;
        let factor = BigDecimal::from(1) - progress * &self.shipping_discount_factor;
        let shipping = &self.base_shipping * factor;

        if shipping < self.min_shipping {
            return round_money(&self.min_shipping);
        }

        // Tiny subtotals round up to the base rate; keep them a cent under it.
        let rounded = round_money(&shipping);
        if rounded >= self.base_shipping {
            round_money(&(&self.base_shipping - BigDecimal::new(1.into(), 2)))
        } else {
            rounded
        }
    }

    pub fn tax_for(&self, subtotal: &BigDecimal) -> BigDecimal {
        subtotal * &self.tax_rate
    }

    pub fn breakdown(&self, subtotal: BigDecimal) -> PriceBreakdown {
        let shipping = self.shipping_for(&subtotal);
        let tax = self.tax_for(&subtotal);
        let total = &subtotal + &tax + &shipping;
        PriceBreakdown {
            subtotal,
            tax,
            shipping,
            total,
        }
    }

    /// Prices a cart from the unit prices captured on its lines.
    pub fn quote(&self, cart: &Cart) -> PriceBreakdown {
        self.breakdown(cart.subtotal())
    }
}
