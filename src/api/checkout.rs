//! Checkout endpoints: totals preview and order placement.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::checkout::{CheckoutItemRequest, CheckoutRequest, CheckoutTotals};
use crate::domain::events;
use crate::error::ApiResult;
use crate::orders::OrderReceipt;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CheckoutItemRequest>,
    /// Destination city, once the shipping step has one.
    pub city: Option<String>,
}

pub async fn quote(State(s): State<AppState>, Json(r): Json<QuoteRequest>) -> ApiResult<Json<CheckoutTotals>> {
    let totals = s.checkout.quote(&r.items, r.city.as_deref()).await?;
    Ok(Json(totals))
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: OrderReceipt,
    pub totals: CheckoutTotals,
}

pub async fn place_order(
    State(s): State<AppState>,
    Json(r): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let placed = s.checkout.place_order(r).await?;
    for event in placed.events {
        events::publish(&s.nats, event).await;
    }
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse { success: true, order: placed.receipt, totals: placed.totals }),
    ))
}
