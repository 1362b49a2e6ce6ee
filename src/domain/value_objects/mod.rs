//! Value objects shared across the storefront domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::i18n::Locale;

/// SKU (Stock Keeping Unit) value object. Normalized to uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 50 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone)] pub enum SkuError { Empty, TooLong }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "SKU empty"), Self::TooLong => write!(f, "SKU too long") }
    }
}

pub const CURRENCY: &str = "AED";

/// Money value object. The storefront trades in a single currency (AED);
/// mixing currencies is rejected rather than silently coerced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn aed(amount: Decimal) -> Self { Self::new(amount, CURRENCY) }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    /// Amount rounded to the 2 decimal places used at rest and on display.
    pub fn rounded(&self) -> Decimal { self.amount.round_dp(2) }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero(CURRENCY) } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rounded(), self.currency)
    }
}

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

/// Bilingual text pair. Arabic falls back to English when blank so a
/// half-translated catalog never renders empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub ar: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self { en: en.into(), ar: ar.into() }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ar if !self.ar.trim().is_empty() => &self.ar,
            _ => &self.en,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku() { let sku = Sku::new("qhw-250-crd").unwrap(); assert_eq!(sku.as_str(), "QHW-250-CRD"); }

    #[test]
    fn test_money_add() {
        let a = Money::aed(Decimal::new(100, 0));
        let b = Money::aed(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_money_currency_mismatch() {
        let a = Money::aed(Decimal::ONE);
        let b = Money::new(Decimal::ONE, "USD");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_money_rounding() {
        let m = Money::aed(Decimal::new(19995, 3)); // 19.995
        assert_eq!(m.rounded(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_localized_fallback() {
        let name = LocalizedText::new("Colombia Arabica", "");
        assert_eq!(name.get(Locale::Ar), "Colombia Arabica");
        let name = LocalizedText::new("Colombia Arabica", "كولومبيا أرابيكا");
        assert_eq!(name.get(Locale::Ar), "كولومبيا أرابيكا");
    }
}
