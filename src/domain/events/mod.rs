//! Domain events published (best-effort) to NATS.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced {
        order_id: Uuid,
        order_number: String,
        email: String,
        total: Decimal,
    },
    /// First purchase created an account; the notification service mails
    /// credentials from this event.
    CustomerRegistered {
        customer_id: Uuid,
        email: String,
        full_name: String,
    },
    OrderStatusChanged {
        order_id: Uuid,
        status: String,
    },
    NewsletterSubscribed {
        email: String,
        locale: String,
    },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "qahwa.orders.placed",
            Self::CustomerRegistered { .. } => "qahwa.customers.registered",
            Self::OrderStatusChanged { .. } => "qahwa.orders.status",
            Self::NewsletterSubscribed { .. } => "qahwa.newsletter.subscribed",
        }
    }
}

/// Fire-and-forget publish; an unreachable broker never fails the request.
pub async fn publish(nats: &Option<async_nats::Client>, event: DomainEvent) {
    let Some(client) = nats else { return };
    let payload = match serde_json::to_vec(&event) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize domain event");
            return;
        }
    };
    if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
        tracing::warn!(error = %e, subject = event.subject(), "failed to publish domain event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects() {
        let e = DomainEvent::NewsletterSubscribed { email: "a@b.ae".into(), locale: "ar".into() };
        assert_eq!(e.subject(), "qahwa.newsletter.subscribed");
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let e = DomainEvent::OrderStatusChanged { order_id: Uuid::nil(), status: "SHIPPED".into() };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["event"], "order_status_changed");
        assert_eq!(json["status"], "SHIPPED");
    }
}
