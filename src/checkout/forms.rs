//! Checkout form validation.
//!
//! Field failures carry translation keys, not prose; the client renders
//! them in the shopper's language and stays on the current step.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::geo;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub emirate: String,
    pub city: String,
    pub address: String,
}

/// `local@domain.tld` shape: one `@`, non-empty local part, dotted domain
/// with a non-empty top-level label.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else { return false };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Loose international format: optional leading `+`, then 7-20 digits after
/// stripping spaces, dashes and parentheses.
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (7..=20).contains(&digits.len())
}

pub fn validate_customer(info: &CustomerInfo) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if info.full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "name_required"));
    }
    if !is_valid_email(&info.email) {
        errors.push(FieldError::new("email", "invalid_email"));
    }
    if !is_valid_phone(&info.phone) {
        errors.push(FieldError::new("phone", "invalid_phone"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_shipping(info: &ShippingInfo) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if info.emirate.trim().is_empty() || geo::find_emirate(&info.emirate).is_none() {
        errors.push(FieldError::new("emirate", "emirate_required"));
    } else if info.city.trim().is_empty() || !geo::city_in_emirate(&info.emirate, &info.city) {
        // The city list is keyed by emirate, so a city from another emirate
        // is as invalid as no city at all.
        errors.push(FieldError::new("city", "city_required"));
    }
    let address = info.address.trim();
    if address.is_empty() {
        errors.push(FieldError::new("address", "address_required"));
    } else if address.chars().count() < 10 {
        errors.push(FieldError::new("address", "complete_address"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
