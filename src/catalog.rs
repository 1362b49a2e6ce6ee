//! Catalog store: product and variation lookup.
//!
//! The `Catalog` trait is the seam between the checkout slice and the
//! database; the Pg implementation is thin sqlx, and tests drive the same
//! logic with an in-memory fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::aggregates::product::{Product, ProductStatus, Variation};
use crate::domain::value_objects::LocalizedText;
use crate::error::StoreError;
use crate::pricing::DiscountKind;

#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub name_ar: String,
    pub slug: String,
    pub description: String,
    pub description_ar: String,
    pub price: Decimal,
    pub discount_value: Option<Decimal>,
    pub discount_kind: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            sku: r.sku,
            name: LocalizedText::new(r.name, r.name_ar),
            slug: r.slug,
            description: LocalizedText::new(r.description, r.description_ar),
            price: r.price,
            discount_value: r.discount_value,
            discount_kind: r.discount_kind.as_deref().and_then(DiscountKind::from_str_opt),
            category_id: r.category_id,
            status: ProductStatus::from_str_or_default(&r.status),
            image_url: r.image_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct VariationRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub size_id: Uuid,
    pub flavor_id: Option<Uuid>,
    pub beans_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub discount_value: Option<Decimal>,
    pub discount_kind: Option<String>,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: bool,
}

impl From<VariationRow> for Variation {
    fn from(r: VariationRow) -> Self {
        Variation {
            id: r.id,
            product_id: r.product_id,
            size_id: r.size_id,
            flavor_id: r.flavor_id,
            beans_id: r.beans_id,
            price: r.price,
            discount_value: r.discount_value,
            discount_kind: r.discount_kind.as_deref().and_then(DiscountKind::from_str_opt),
            stock: r.stock,
            sku: r.sku,
            is_active: r.is_active,
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;
    /// Case-insensitive substring search over name, Arabic name and SKU,
    /// ordered by creation time so the "first match" is deterministic.
    async fn search_products(&self, term: &str) -> Result<Vec<Product>, StoreError>;
    async fn variations_of(&self, product_id: Uuid) -> Result<Vec<Variation>, StoreError>;
}

/// Resolve a product from a URL key that may be a raw id, an exact slug, or
/// a mangled slug. The loose path normalizes `-` back to spaces and takes
/// the first substring match; misses fail with `ProductNotFound`.
pub async fn resolve_product_by_key(catalog: &dyn Catalog, key: &str) -> Result<Product, StoreError> {
    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(p) = catalog.product_by_id(id).await? {
            return Ok(p);
        }
    }
    if let Some(p) = catalog.product_by_slug(key).await? {
        return Ok(p);
    }
    let normalized = key.replace('-', " ");
    let matches = catalog.search_products(&normalized).await?;
    matches.into_iter().next().ok_or(StoreError::ProductNotFound)
}

#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1 AND status <> 'deleted'")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE slug = $1 AND status <> 'deleted'")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE status <> 'deleted' \
             AND (name ILIKE '%' || $1 || '%' OR name_ar ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%') \
             ORDER BY created_at ASC",
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn variations_of(&self, product_id: Uuid) -> Result<Vec<Variation>, StoreError> {
        let rows = sqlx::query_as::<_, VariationRow>(
            "SELECT * FROM product_variations WHERE product_id = $1 ORDER BY created_at ASC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Variation::from).collect())
    }
}
