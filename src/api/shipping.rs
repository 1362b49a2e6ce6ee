//! Shipping quote and rule administration endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiResult, StoreError};
use crate::pricing::PricedItem;
use crate::shipping::{calculate_shipping, RuleType, ShippingQuote, ShippingRule, ShippingRuleRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShippingQuoteRequest {
    pub order_total: Decimal,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Standalone shipping quote; rule-source failures degrade to the fallback
/// rate inside `calculate_shipping`, so this endpoint cannot fail on them.
pub async fn quote(
    State(s): State<AppState>,
    Json(r): Json<ShippingQuoteRequest>,
) -> ApiResult<Json<ShippingQuote>> {
    let items: Vec<PricedItem> = r
        .items
        .iter()
        .map(|i| PricedItem {
            product_id: i.product_id,
            variation_id: None,
            name: String::new(),
            sku: None,
            quantity: i.quantity,
            unit_price: Decimal::ZERO,
            line_total: Decimal::ZERO,
        })
        .collect();
    let quote = calculate_shipping(r.order_total, &items, r.city.as_deref(), s.rules.as_ref()).await;
    Ok(Json(quote))
}

pub async fn list_rules(State(s): State<AppState>) -> ApiResult<Json<Vec<ShippingRuleRow>>> {
    let rules = sqlx::query_as::<_, ShippingRuleRow>("SELECT * FROM shipping_rules ORDER BY created_at ASC")
        .fetch_all(&s.db)
        .await?;
    Ok(Json(rules))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleRequest {
    pub rule_type: RuleType,
    #[validate(length(min = 1))]
    pub name: String,
    pub cost: Decimal,
    pub free_over: Option<Decimal>,
    pub cities: Option<Vec<String>>,
}

pub async fn create_rule(
    State(s): State<AppState>,
    Json(r): Json<CreateRuleRequest>,
) -> ApiResult<(StatusCode, Json<ShippingRule>)> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    if r.cost < Decimal::ZERO {
        return Err(StoreError::BadRequest("cost must not be negative".into()));
    }
    let row = sqlx::query_as::<_, ShippingRuleRow>(
        "INSERT INTO shipping_rules (id, rule_type, name, cost, free_over, cities, is_active, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(r.rule_type.as_str())
    .bind(&r.name)
    .bind(r.cost)
    .bind(r.free_over)
    .bind(&r.cities)
    .fetch_one(&s.db)
    .await?;
    let rule = ShippingRule {
        id: row.id,
        rule_type: r.rule_type,
        name: row.name,
        cost: row.cost,
        free_over: row.free_over,
        cities: row.cities,
        is_active: row.is_active,
    };
    Ok((StatusCode::CREATED, Json(rule)))
}
