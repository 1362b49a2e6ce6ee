//! Shipping cost calculation.
//!
//! Rules come from the rule source (the `shipping_rules` table in
//! production). Any failure there is swallowed and replaced by the
//! hardcoded fallback so checkout stays usable while the rule data is
//! unreachable.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::PricedItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Standard,
    Express,
    Free,
    Pickup,
}

impl RuleType {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "STANDARD" => Some(Self::Standard),
            "EXPRESS" => Some(Self::Express),
            "FREE" => Some(Self::Free),
            "PICKUP" => Some(Self::Pickup),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Express => "EXPRESS",
            Self::Free => "FREE",
            Self::Pickup => "PICKUP",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShippingRule {
    pub id: Uuid,
    pub rule_type: RuleType,
    pub name: String,
    pub cost: Decimal,
    /// Subtotal at or above which this rule ships free.
    pub free_over: Option<Decimal>,
    /// When present, the rule only applies to these destination cities.
    pub cities: Option<Vec<String>>,
    pub is_active: bool,
}

impl ShippingRule {
    fn applies_to(&self, city: Option<&str>) -> bool {
        match (&self.cities, city) {
            (None, _) => true,
            (Some(cities), Some(city)) => cities.iter().any(|c| c.eq_ignore_ascii_case(city)),
            (Some(_), None) => false,
        }
    }

    fn cost_for(&self, order_total: Decimal) -> Decimal {
        if self.rule_type == RuleType::Free {
            return Decimal::ZERO;
        }
        match self.free_over {
            Some(threshold) if order_total >= threshold => Decimal::ZERO,
            _ => self.cost,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ShippingQuote {
    pub cost: Decimal,
    pub rule: Option<ShippingRule>,
}

#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn active_rules(&self) -> anyhow::Result<Vec<ShippingRule>>;
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ShippingRuleRow {
    pub id: Uuid,
    pub rule_type: String,
    pub name: String,
    pub cost: Decimal,
    pub free_over: Option<Decimal>,
    pub cities: Option<Vec<String>>,
    pub is_active: bool,
}

impl ShippingRuleRow {
    fn into_rule(self) -> Option<ShippingRule> {
        Some(ShippingRule {
            id: self.id,
            rule_type: RuleType::from_str_opt(&self.rule_type)?,
            name: self.name,
            cost: self.cost,
            free_over: self.free_over,
            cities: self.cities,
            is_active: self.is_active,
        })
    }
}

#[derive(Clone)]
pub struct PgRuleSource {
    pool: sqlx::PgPool,
}

impl PgRuleSource {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleSource for PgRuleSource {
    async fn active_rules(&self) -> anyhow::Result<Vec<ShippingRule>> {
        let rows = sqlx::query_as::<_, ShippingRuleRow>(
            "SELECT * FROM shipping_rules WHERE is_active ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        // Rows with an unknown rule_type are skipped rather than failing the
        // whole quote.
        Ok(rows.into_iter().filter_map(ShippingRuleRow::into_rule).collect())
    }
}

/// Fallback applied whenever the rule source is unavailable: free at or
/// above 200 AED, flat 25 AED below. Must stay bit-for-bit compatible with
/// the storefront the rates were lifted from.
pub const FALLBACK_FREE_OVER: Decimal = Decimal::from_parts(200, 0, 0, false, 0);
pub const FALLBACK_FLAT_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

pub fn fallback_cost(order_total: Decimal) -> Decimal {
    if order_total >= FALLBACK_FREE_OVER { Decimal::ZERO } else { FALLBACK_FLAT_RATE }
}

/// Quote shipping for an order. City-restricted rules are only considered
/// for a matching destination; the first applicable rule wins. Rule-source
/// errors never propagate.
pub async fn calculate_shipping(
    order_total: Decimal,
    _items: &[PricedItem],
    city: Option<&str>,
    rules: &dyn RuleSource,
) -> ShippingQuote {
    match rules.active_rules().await {
        Ok(all) => {
            let matched = all.into_iter().filter(|r| r.is_active).find(|r| r.applies_to(city));
            match matched {
                Some(rule) => ShippingQuote { cost: rule.cost_for(order_total), rule: Some(rule) },
                None => ShippingQuote { cost: fallback_cost(order_total), rule: None },
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "shipping rule lookup failed, using fallback rate");
            ShippingQuote { cost: fallback_cost(order_total), rule: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<ShippingRule>);
    #[async_trait]
    impl RuleSource for Fixed {
        async fn active_rules(&self) -> anyhow::Result<Vec<ShippingRule>> { Ok(self.0.clone()) }
    }

    struct Offline;
    #[async_trait]
    impl RuleSource for Offline {
        async fn active_rules(&self) -> anyhow::Result<Vec<ShippingRule>> {
            anyhow::bail!("connection refused")
        }
    }

    fn rule(rule_type: RuleType, cost: i64, free_over: Option<i64>, cities: Option<Vec<String>>) -> ShippingRule {
        ShippingRule {
            id: Uuid::new_v4(),
            rule_type,
            name: "test".into(),
            cost: Decimal::new(cost, 0),
            free_over: free_over.map(|t| Decimal::new(t, 0)),
            cities,
            is_active: true,
        }
    }

    #[test]
    fn test_fallback_boundary_inclusive_at_200() {
        assert_eq!(fallback_cost(Decimal::new(19999, 2)), Decimal::new(25, 0));
        assert_eq!(fallback_cost(Decimal::new(200, 0)), Decimal::ZERO);
        assert_eq!(fallback_cost(Decimal::new(20001, 2)), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_offline_source_uses_fallback() {
        let q = calculate_shipping(Decimal::new(180, 0), &[], Some("Dubai"), &Offline).await;
        assert_eq!(q.cost, Decimal::new(25, 0));
        assert!(q.rule.is_none());

        let q = calculate_shipping(Decimal::new(250, 0), &[], Some("Dubai"), &Offline).await;
        assert_eq!(q.cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_free_rule_always_zero() {
        let src = Fixed(vec![rule(RuleType::Free, 0, None, None)]);
        let q = calculate_shipping(Decimal::new(10, 0), &[], None, &src).await;
        assert_eq!(q.cost, Decimal::ZERO);
        assert!(q.rule.is_some());
    }

    #[tokio::test]
    async fn test_threshold_rule() {
        let src = Fixed(vec![rule(RuleType::Standard, 30, Some(150), None)]);
        let q = calculate_shipping(Decimal::new(149, 0), &[], None, &src).await;
        assert_eq!(q.cost, Decimal::new(30, 0));
        let q = calculate_shipping(Decimal::new(150, 0), &[], None, &src).await;
        assert_eq!(q.cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_city_restricted_rule_skipped_for_other_city() {
        let src = Fixed(vec![
            rule(RuleType::Express, 15, None, Some(vec!["Dubai".into()])),
            rule(RuleType::Standard, 30, None, None),
        ]);
        let q = calculate_shipping(Decimal::new(50, 0), &[], Some("Dubai"), &src).await;
        assert_eq!(q.cost, Decimal::new(15, 0));
        let q = calculate_shipping(Decimal::new(50, 0), &[], Some("Al Ain"), &src).await;
        assert_eq!(q.cost, Decimal::new(30, 0));
    }

    #[tokio::test]
    async fn test_no_matching_rule_falls_back() {
        let src = Fixed(vec![rule(RuleType::Express, 15, None, Some(vec!["Dubai".into()]))]);
        let q = calculate_shipping(Decimal::new(300, 0), &[], Some("Sharjah"), &src).await;
        assert_eq!(q.cost, Decimal::ZERO); // fallback, above 200
        assert!(q.rule.is_none());
    }
}
