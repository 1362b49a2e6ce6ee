//! Admin order endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::PaginatedResponse;
use crate::domain::aggregates::OrderStatus;
use crate::domain::events::{self, DomainEvent};
use crate::error::{ApiResult, StoreError};
use crate::orders::{OrderItemRow, OrderRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_orders(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<OrderRow>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let (orders, total) = s.orders.list(per_page as i64, ((page - 1) * per_page) as i64).await?;
    Ok(Json(PaginatedResponse { data: orders, total, page }))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<OrderDetail>> {
    let (order, items) = s.orders.get(id).await?;
    Ok(Json(OrderDetail { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<UpdateStatusRequest>,
) -> ApiResult<Json<OrderRow>> {
    let next = OrderStatus::from_str_opt(&r.status)
        .ok_or_else(|| StoreError::BadRequest(format!("unknown status: {}", r.status)))?;
    let updated = s.orders.update_status(id, next).await?;
    events::publish(
        &s.nats,
        DomainEvent::OrderStatusChanged { order_id: id, status: next.as_str().to_string() },
    )
    .await;
    Ok(Json(updated))
}
