//! Newsletter subscription endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::events::{self, DomainEvent};
use crate::error::{ApiResult, StoreError};
use crate::i18n::{t, Locale};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email)]
    pub email: String,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

pub async fn subscribe(
    State(s): State<AppState>,
    Json(r): Json<SubscribeRequest>,
) -> ApiResult<(StatusCode, Json<SubscribeResponse>)> {
    r.validate().map_err(|e| StoreError::BadRequest(e.to_string()))?;
    let locale = Locale::from_tag(r.lang.as_deref().unwrap_or("en"));
    let email = r.email.trim().to_lowercase();

    // Re-subscribing is a no-op, not an error.
    sqlx::query(
        "INSERT INTO newsletter_subscribers (id, email, locale, created_at) VALUES ($1, $2, $3, NOW()) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(&email)
    .bind(locale.tag())
    .execute(&s.db)
    .await?;

    events::publish(&s.nats, DomainEvent::NewsletterSubscribed { email, locale: locale.tag().to_string() }).await;

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse { success: true, message: t(locale, "newsletter_subscribed").to_string() }),
    ))
}
