//! Discount application over catalog prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One checkout line after server-side repricing. Client-submitted prices
/// are display snapshots only and never reach this type.
#[derive(Clone, Debug, Serialize)]
pub struct PricedItem {
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
}

impl DiscountKind {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "PERCENTAGE" => Some(Self::Percentage),
            "FIXED_AMOUNT" => Some(Self::FixedAmount),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::FixedAmount => "FIXED_AMOUNT",
        }
    }
}

/// Apply a discount to a base price.
///
/// A missing or non-positive discount leaves the price untouched. Percentage
/// discounts scale by `1 - d/100`; fixed-amount discounts clamp at zero. The
/// result is never negative.
pub fn discounted_price(base: Decimal, discount: Option<Decimal>, kind: Option<DiscountKind>) -> Decimal {
    let d = match discount {
        Some(d) if d > Decimal::ZERO => d,
        _ => return base,
    };
    match kind {
        Some(DiscountKind::Percentage) => base * (Decimal::ONE - d / Decimal::ONE_HUNDRED),
        Some(DiscountKind::FixedAmount) => (base - d).max(Decimal::ZERO),
        None => base,
    }
}

/// Effective unit price of a variation: the variation price overrides the
/// product base price, and the variation discount takes precedence over the
/// product-level discount.
pub fn effective_unit_price(
    product_price: Decimal,
    product_discount: Option<(Decimal, DiscountKind)>,
    variation_price: Option<Decimal>,
    variation_discount: Option<(Decimal, DiscountKind)>,
) -> Decimal {
    let base = variation_price.unwrap_or(product_price);
    let (value, kind) = match variation_discount.or(product_discount) {
        Some((v, k)) => (Some(v), Some(k)),
        None => (None, None),
    };
    discounted_price(base, value, kind)
}
