//! HTTP surface: the router and its handler modules.

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod categories;
pub mod checkout;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod shipping;

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "qahwa-store"})) }))
        .route("/api/v1/products", get(products::list_products).post(products::create_product))
        .route("/api/v1/products/:key", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/api/v1/products/:key/variations", get(products::get_product_variations).post(products::create_variation))
        .route("/api/v1/categories", get(categories::list_categories).post(categories::create_category))
        .route("/api/v1/categories/:id", get(categories::get_category).put(categories::update_category))
        .route("/api/v1/shipping/quote", post(shipping::quote))
        .route("/api/v1/shipping/rules", get(shipping::list_rules).post(shipping::create_rule))
        .route("/api/v1/checkout/quote", post(checkout::quote))
        .route("/api/v1/checkout", post(checkout::place_order))
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/orders/:id/status", put(orders::update_order_status))
        .route("/api/v1/newsletter", post(newsletter::subscribe))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
