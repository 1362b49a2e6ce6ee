//! Category endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiResult, StoreError};
use crate::state::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub name_ar: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<CategoryRow>>> {
    let cats = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&s.db)
        .await?;
    Ok(Json(cats))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<CategoryRow>> {
    sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(StoreError::CategoryNotFound)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    pub parent_id: Option<Uuid>,
}

/// Walks the parent chain and reports whether `candidate_parent` descends
/// from `id` (which would make `id` its own ancestor).
async fn creates_cycle(s: &AppState, id: Uuid, candidate_parent: Option<Uuid>) -> ApiResult<bool> {
    let mut cursor = candidate_parent;
    while let Some(parent) = cursor {
        if parent == id {
            return Ok(true);
        }
        let row: Option<(Option<Uuid>,)> = sqlx::query_as("SELECT parent_id FROM categories WHERE id = $1")
            .bind(parent)
            .fetch_optional(&s.db)
            .await?;
        cursor = row.ok_or(StoreError::CategoryNotFound)?.0;
    }
    Ok(false)
}

pub async fn create_category(
    State(s): State<AppState>,
    Json(r): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryRow>)> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    if let Some(parent) = r.parent_id {
        // Existence check; a fresh id cannot be its own ancestor yet.
        creates_cycle(&s, Uuid::nil(), Some(parent)).await?;
    }
    let slug = r.name.to_lowercase().replace(' ', "-");
    let c = sqlx::query_as::<_, CategoryRow>(
        "INSERT INTO categories (id, name, name_ar, slug, parent_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&r.name_ar)
    .bind(&slug)
    .bind(r.parent_id)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(c)))
}

pub async fn update_category(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CategoryRequest>,
) -> ApiResult<Json<CategoryRow>> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    if r.parent_id == Some(id) || creates_cycle(&s, id, r.parent_id).await? {
        return Err(StoreError::BadRequest("category cannot be its own ancestor".into()));
    }
    let c = sqlx::query_as::<_, CategoryRow>(
        "UPDATE categories SET name = $2, name_ar = $3, parent_id = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.name_ar)
    .bind(r.parent_id)
    .fetch_optional(&s.db)
    .await?
    .ok_or(StoreError::CategoryNotFound)?;
    Ok(Json(c))
}
