//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::PaginatedResponse;
use crate::catalog::{resolve_product_by_key, Catalog, ProductRow, VariationRow};
use crate::domain::aggregates::product::{Product, Variation};
use crate::domain::value_objects::Sku;
use crate::error::{ApiResult, StoreError};
use crate::i18n::Locale;
use crate::pricing::{discounted_price, DiscountKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub display_name: String,
    pub display_description: String,
    /// Base price with any product-level discount applied.
    pub effective_price: Decimal,
}

fn present(product: Product, locale: Locale) -> ProductResponse {
    let display_name = product.name.get(locale).to_string();
    let display_description = product.description.get(locale).to_string();
    let effective_price =
        discounted_price(product.price, product.discount_value, product.discount_kind).round_dp(2);
    ProductResponse { product, display_name, display_description, effective_price }
}

pub async fn list_products(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<ProductResponse>>> {
    let locale = Locale::from_tag(p.lang.as_deref().unwrap_or("en"));
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let search = p.search.as_deref().filter(|t| !t.trim().is_empty());

    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT * FROM products WHERE status = 'active' \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR name_ar ILIKE '%' || $2 || '%' OR sku ILIKE '%' || $2 || '%') \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(p.category)
    .bind(search)
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .fetch_all(&s.db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE status = 'active' \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR name_ar ILIKE '%' || $2 || '%' OR sku ILIKE '%' || $2 || '%')",
    )
    .bind(p.category)
    .bind(search)
    .fetch_one(&s.db)
    .await?;

    let data = rows.into_iter().map(|r| present(Product::from(r), locale)).collect();
    Ok(Json(PaginatedResponse { data, total: total.0, page }))
}

#[derive(Debug, Deserialize)]
pub struct LangParam {
    pub lang: Option<String>,
}

/// Product pages resolve by slug, by raw id, or by a loose name fragment.
pub async fn get_product(
    State(s): State<AppState>,
    Path(key): Path<String>,
    Query(q): Query<LangParam>,
) -> ApiResult<Json<ProductResponse>> {
    let locale = Locale::from_tag(q.lang.as_deref().unwrap_or("en"));
    let product = resolve_product_by_key(s.catalog.as_ref(), &key).await?;
    Ok(Json(present(product, locale)))
}

pub async fn get_product_variations(
    State(s): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<Variation>>> {
    let product = resolve_product_by_key(s.catalog.as_ref(), &key).await?;
    let variations = s.catalog.variations_of(product.id).await?;
    Ok(Json(variations))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ar: String,
    pub price: Decimal,
    pub discount_value: Option<Decimal>,
    pub discount_kind: Option<DiscountKind>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
}

fn slugify(name: &str) -> String {
    name.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

pub async fn create_product(
    State(s): State<AppState>,
    Json(r): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    if r.price < Decimal::ZERO {
        return Err(StoreError::BadRequest("price must not be negative".into()));
    }
    let slug = r.slug.clone().unwrap_or_else(|| slugify(&r.name));
    let sku = format!("QHW-{:08}", rand::random::<u32>() % 100_000_000);
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (id, sku, name, name_ar, slug, description, description_ar, price, \
         discount_value, discount_kind, category_id, status, image_url, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'active', $12, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&sku)
    .bind(&r.name)
    .bind(&r.name_ar)
    .bind(&slug)
    .bind(&r.description)
    .bind(&r.description_ar)
    .bind(r.price)
    .bind(r.discount_value)
    .bind(r.discount_kind.map(DiscountKind::as_str))
    .bind(r.category_id)
    .bind(&r.image_url)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(present(Product::from(row), Locale::En))))
}

pub async fn update_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CreateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    let row = sqlx::query_as::<_, ProductRow>(
        "UPDATE products SET name = $2, name_ar = $3, description = $4, description_ar = $5, price = $6, \
         discount_value = $7, discount_kind = $8, category_id = $9, image_url = $10, updated_at = NOW() \
         WHERE id = $1 AND status <> 'deleted' RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.name_ar)
    .bind(&r.description)
    .bind(&r.description_ar)
    .bind(r.price)
    .bind(r.discount_value)
    .bind(r.discount_kind.map(DiscountKind::as_str))
    .bind(r.category_id)
    .bind(&r.image_url)
    .fetch_optional(&s.db)
    .await?
    .ok_or(StoreError::ProductNotFound)?;
    Ok(Json(present(Product::from(row), Locale::En)))
}

/// Soft delete: the product disappears from the storefront but order item
/// snapshots keep pointing at a real row.
pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let res = sqlx::query("UPDATE products SET status = 'deleted', updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(StoreError::ProductNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariationRequest {
    pub size_id: Uuid,
    pub flavor_id: Option<Uuid>,
    pub beans_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub discount_value: Option<Decimal>,
    pub discount_kind: Option<DiscountKind>,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub sku: Option<String>,
}

pub async fn create_variation(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CreateVariationRequest>,
) -> ApiResult<(StatusCode, Json<Variation>)> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    let sku = r.sku.as_deref().map(Sku::new).transpose().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    let product = s.catalog.product_by_id(id).await?.ok_or(StoreError::ProductNotFound)?;
    let row = sqlx::query_as::<_, VariationRow>(
        "INSERT INTO product_variations (id, product_id, size_id, flavor_id, beans_id, price, \
         discount_value, discount_kind, stock, sku, is_active, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(product.id)
    .bind(r.size_id)
    .bind(r.flavor_id)
    .bind(r.beans_id)
    .bind(r.price)
    .bind(r.discount_value)
    .bind(r.discount_kind.map(DiscountKind::as_str))
    .bind(r.stock)
    .bind(sku.as_ref().map(Sku::as_str))
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(Variation::from(row))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Colombia Arabica Coffee"), "colombia-arabica-coffee");
        assert_eq!(slugify("  Dark   Roast  "), "dark-roast");
    }
}
