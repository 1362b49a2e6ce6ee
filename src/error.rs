//! Service-wide error taxonomy and its HTTP mapping.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

/// One field that failed validation, carrying a translation key rather than
/// prose so the client renders it in the shopper's language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message_key: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message_key: &'static str) -> Self {
        Self { field, message_key }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Variation not found")]
    VariationNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock")]
    InsufficientStock,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Payment failed: {0}")]
    Payment(String),

    /// Payment has been captured but the order row could not be written;
    /// requires manual reconciliation.
    #[error("Order creation failed")]
    OrderCreationFailed,

    #[error("Illegal status transition")]
    IllegalTransition,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl StoreError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ProductNotFound | Self::VariationNotFound | Self::CategoryNotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::EmptyCart | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InsufficientStock | Self::IllegalTransition => StatusCode::CONFLICT,
            Self::Payment(_) => StatusCode::PAYMENT_REQUIRED,
            Self::OrderCreationFailed | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = match self {
            Self::Validation(fields) => ErrorBody { error: "validation_failed".into(), fields: Some(fields) },
            Self::OrderCreationFailed => ErrorBody { error: "order_creation_failed".into(), fields: None },
            Self::Database(_) => ErrorBody { error: "internal_error".into(), fields: None },
            other => ErrorBody { error: other.to_string(), fields: None },
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, StoreError>;
