//! Payment gateway seam.
//!
//! The real processor sits behind this trait (create intent, confirm
//! charge). The service only ever sees a client secret and a confirmation
//! reference, or a human-readable failure message that is surfaced to the
//! shopper verbatim.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Gateway charge reference stored on the order.
    pub reference: String,
}

/// Failure message comes from the gateway and is shown to the shopper as-is.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PaymentDeclined(pub String);

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        order_email: &str,
    ) -> Result<PaymentIntent, PaymentDeclined>;

    async fn confirm(
        &self,
        client_secret: &str,
        payment_method: &str,
    ) -> Result<PaymentConfirmation, PaymentDeclined>;
}

/// Development gateway: authorizes everything and mints references locally.
/// Production deployments swap in a processor-backed implementation here.
#[derive(Clone, Default)]
pub struct SandboxGateway;

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        _order_email: &str,
    ) -> Result<PaymentIntent, PaymentDeclined> {
        if amount <= Decimal::ZERO {
            return Err(PaymentDeclined("amount must be positive".into()));
        }
        Ok(PaymentIntent {
            client_secret: format!("cs_test_{:016x}", rand::random::<u64>()),
            amount,
            currency: currency.to_string(),
        })
    }

    async fn confirm(
        &self,
        client_secret: &str,
        _payment_method: &str,
    ) -> Result<PaymentConfirmation, PaymentDeclined> {
        if client_secret.is_empty() {
            return Err(PaymentDeclined("missing client secret".into()));
        }
        Ok(PaymentConfirmation { reference: format!("PAY-{:08}", rand::random::<u32>() % 100_000_000) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sandbox_round_trip() {
        let gw = SandboxGateway;
        let intent = gw.create_intent(Decimal::new(205, 0), "AED", "maha@example.ae").await.unwrap();
        assert!(intent.client_secret.starts_with("cs_test_"));
        let conf = gw.confirm(&intent.client_secret, "card").await.unwrap();
        assert!(conf.reference.starts_with("PAY-"));
    }

    #[tokio::test]
    async fn test_sandbox_rejects_non_positive_amount() {
        let gw = SandboxGateway;
        assert!(gw.create_intent(Decimal::ZERO, "AED", "x@y.ae").await.is_err());
    }
}
