//! Order persistence: the order writer behind the checkout flow, plus the
//! admin-side queries.
//!
//! `create_order` runs one transaction: customer upsert by email, stock
//! decrement with a conflict check, then the order row and its item
//! snapshots. A stock conflict rolls the whole transaction back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::checkout::forms::{CustomerInfo, ShippingInfo};
use crate::domain::aggregates::OrderStatus;
use crate::error::StoreError;
use crate::pricing::PricedItem;

#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
    pub items: Vec<PricedItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub payment_ref: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub is_new_customer: bool,
    pub total: Decimal,
    pub status: OrderStatus,
}

#[async_trait]
pub trait OrderWriter: Send + Sync {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, StoreError>;
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub emirate: String,
    pub city: String,
    pub address: String,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub payment_ref: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Clone)]
pub struct PgOrderWriter {
    pool: PgPool,
}

impl PgOrderWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn new_order_number() -> String {
    format!("ORD-{:08}", rand::random::<u32>() % 100_000_000)
}

#[async_trait]
impl OrderWriter for PgOrderWriter {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, StoreError> {
        let mut tx = self.pool.begin().await?;

        let email = draft.customer.email.trim().to_lowercase();
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM customers WHERE email = $1")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;
        let (customer_id, is_new_customer) = match existing {
            Some((id,)) => (id, false),
            None => {
                let id = Uuid::now_v7();
                sqlx::query("INSERT INTO customers (id, email, full_name, phone, created_at) VALUES ($1, $2, $3, $4, NOW())")
                    .bind(id)
                    .bind(&email)
                    .bind(&draft.customer.full_name)
                    .bind(&draft.customer.phone)
                    .execute(&mut *tx)
                    .await?;
                (id, true)
            }
        };

        for item in &draft.items {
            let Some(variation_id) = item.variation_id else { continue };
            let res = sqlx::query("UPDATE product_variations SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                .bind(variation_id)
                .bind(item.quantity as i32)
                .execute(&mut *tx)
                .await?;
            if res.rows_affected() == 0 {
                return Err(StoreError::InsufficientStock);
            }
        }

        let order_id = Uuid::now_v7();
        let order_number = new_order_number();
        sqlx::query(
            "INSERT INTO orders (id, order_number, customer_id, customer_name, email, phone, emirate, city, address, \
             subtotal, shipping_cost, discount_total, total, payment_ref, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW(), NOW())",
        )
        .bind(order_id)
        .bind(&order_number)
        .bind(customer_id)
        .bind(&draft.customer.full_name)
        .bind(&email)
        .bind(&draft.customer.phone)
        .bind(&draft.shipping.emirate)
        .bind(&draft.shipping.city)
        .bind(&draft.shipping.address)
        .bind(draft.subtotal)
        .bind(draft.shipping_cost)
        .bind(draft.discount_total)
        .bind(draft.total)
        .bind(&draft.payment_ref)
        .bind(OrderStatus::New.as_str())
        .execute(&mut *tx)
        .await?;

        for item in &draft.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, variation_id, name, sku, quantity, unit_price, line_total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(Uuid::now_v7())
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.variation_id)
            .bind(&item.name)
            .bind(&item.sku)
            .bind(item.quantity as i32)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderReceipt {
            order_id,
            order_number,
            customer_id,
            is_new_customer,
            total: draft.total,
            status: OrderStatus::New,
        })
    }
}

impl PgOrderWriter {
    pub async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<OrderRow>, i64), StoreError> {
        let orders = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(&self.pool).await?;
        Ok((orders, total.0))
    }

    pub async fn get(&self, id: Uuid) -> Result<(OrderRow, Vec<OrderItemRow>), StoreError> {
        let order = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::OrderNotFound)?;
        let items = sqlx::query_as::<_, OrderItemRow>("SELECT * FROM order_items WHERE order_id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok((order, items))
    }

    /// Moves an order along the fulfilment lifecycle; illegal jumps are
    /// rejected before touching the row.
    pub async fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<OrderRow, StoreError> {
        let current = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::OrderNotFound)?;
        let from = OrderStatus::from_str_opt(&current.status).unwrap_or_default();
        if !from.can_transition_to(next) {
            return Err(StoreError::IllegalTransition);
        }
        let updated = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }
}
