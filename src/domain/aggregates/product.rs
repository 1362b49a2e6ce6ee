//! Product aggregate: a roast with its sellable variations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::LocalizedText;
use crate::pricing::{effective_unit_price, DiscountKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    #[default]
    Active,
    Deleted,
}

impl ProductStatus {
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "deleted" => Self::Deleted,
            _ => Self::Active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: LocalizedText,
    pub slug: String,
    pub description: LocalizedText,
    pub price: Decimal,
    pub discount_value: Option<Decimal>,
    pub discount_kind: Option<DiscountKind>,
    pub category_id: Option<Uuid>,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sellable configuration: size is mandatory, flavor and bean optional
/// depending on the product family (plain roasts carry no flavor dimension).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variation {
    pub id: Uuid,
    pub product_id: Uuid,
    pub size_id: Uuid,
    pub flavor_id: Option<Uuid>,
    pub beans_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub discount_value: Option<Decimal>,
    pub discount_kind: Option<DiscountKind>,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: bool,
}

impl Variation {
    pub fn in_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity as i32
    }

    fn discount(&self) -> Option<(Decimal, DiscountKind)> {
        match (self.discount_value, self.discount_kind) {
            (Some(v), Some(k)) => Some((v, k)),
            _ => None,
        }
    }
}

/// The dimensions a shopper picked on the product page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationSelection {
    pub size_id: Uuid,
    pub flavor_id: Option<Uuid>,
    pub beans_id: Option<Uuid>,
}

impl Product {
    pub fn is_purchasable(&self) -> bool {
        self.status == ProductStatus::Active
    }

    fn discount(&self) -> Option<(Decimal, DiscountKind)> {
        match (self.discount_value, self.discount_kind) {
            (Some(v), Some(k)) => Some((v, k)),
            _ => None,
        }
    }

    /// Unit price for a resolved variation of this product, discounts applied.
    pub fn unit_price(&self, variation: &Variation) -> Decimal {
        effective_unit_price(self.price, self.discount(), variation.price, variation.discount())
    }

    /// Unit price when the product is sold without variations.
    pub fn base_unit_price(&self) -> Decimal {
        effective_unit_price(self.price, self.discount(), None, None)
    }
}

/// Exact-match resolution over active variations only. A combination that
/// does not exist is reported as `None`; there is no nearest-match
/// substitution, an ambiguous pick must fail loudly.
pub fn resolve_variation<'a>(
    variations: &'a [Variation],
    selection: &VariationSelection,
) -> Option<&'a Variation> {
    variations.iter().find(|v| {
        v.is_active
            && v.size_id == selection.size_id
            && v.flavor_id == selection.flavor_id
            && v.beans_id == selection.beans_id
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: Uuid::new_v4(),
            sku: Some("QHW-COL".into()),
            name: LocalizedText::new("Colombia Arabica Coffee", "قهوة كولومبيا أرابيكا"),
            slug: "colombia-arabica-coffee".into(),
            description: LocalizedText::default(),
            price: Decimal::new(5500, 2),
            discount_value: None,
            discount_kind: None,
            category_id: None,
            status: ProductStatus::Active,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variation(product_id: Uuid, size: Uuid, flavor: Option<Uuid>, active: bool) -> Variation {
        Variation {
            id: Uuid::new_v4(),
            product_id,
            size_id: size,
            flavor_id: flavor,
            beans_id: None,
            price: None,
            discount_value: None,
            discount_kind: None,
            stock: 10,
            sku: None,
            is_active: active,
        }
    }

    #[test]
    fn test_exact_match_only() {
        let p = product();
        let size_250 = Uuid::new_v4();
        let cardamom = Uuid::new_v4();
        let saffron = Uuid::new_v4();
        let rose = Uuid::new_v4();
        let vars = vec![
            variation(p.id, size_250, Some(cardamom), true),
            variation(p.id, size_250, Some(saffron), true),
        ];

        let hit = resolve_variation(&vars, &VariationSelection { size_id: size_250, flavor_id: Some(cardamom), beans_id: None });
        assert!(hit.is_some());

        // Requesting a flavor that was never configured must not substitute
        // one of the existing ones.
        let miss = resolve_variation(&vars, &VariationSelection { size_id: size_250, flavor_id: Some(rose), beans_id: None });
        assert!(miss.is_none());
    }

    #[test]
    fn test_inactive_variations_are_invisible() {
        let p = product();
        let size = Uuid::new_v4();
        let vars = vec![variation(p.id, size, None, false)];
        let miss = resolve_variation(&vars, &VariationSelection { size_id: size, flavor_id: None, beans_id: None });
        assert!(miss.is_none());
    }

    #[test]
    fn test_missing_optional_dimension_is_not_wildcard() {
        let p = product();
        let size = Uuid::new_v4();
        let cardamom = Uuid::new_v4();
        let vars = vec![variation(p.id, size, Some(cardamom), true)];
        // A flavored variation exists, but the shopper asked for the plain one.
        let miss = resolve_variation(&vars, &VariationSelection { size_id: size, flavor_id: None, beans_id: None });
        assert!(miss.is_none());
    }

    #[test]
    fn test_unit_price_uses_variation_override() {
        let p = product();
        let size = Uuid::new_v4();
        let mut v = variation(p.id, size, None, true);
        v.price = Some(Decimal::new(9900, 2));
        assert_eq!(p.unit_price(&v), Decimal::new(9900, 2));
        v.price = None;
        assert_eq!(p.unit_price(&v), Decimal::new(5500, 2));
    }

    #[test]
    fn test_stock_check() {
        let p = product();
        let v = variation(p.id, Uuid::new_v4(), None, true);
        assert!(v.in_stock(10));
        assert!(!v.in_stock(11));
    }
}
