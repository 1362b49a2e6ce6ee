//! Order aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Money;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "PROCESSING" => Some(Self::Processing),
            "SHIPPED" => Some(Self::Shipped),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Forward fulfilment moves one step at a time; cancellation is allowed
    /// any time before delivery.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (New, Processing) | (Processing, Shipped) | (Shipped, Delivered)
                | (New, Cancelled) | (Processing, Cancelled) | (Shipped, Cancelled)
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub emirate: String,
    pub city: String,
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    customer_name: String,
    email: String,
    phone: String,
    status: OrderStatus,
    items: Vec<LineItem>,
    subtotal: Money,
    shipping: Money,
    discount: Money,
    total: Money,
    shipping_address: ShippingAddress,
    payment_ref: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        order_number: impl Into<String>,
        customer_id: Uuid,
        customer_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        shipping_address: ShippingAddress,
        payment_ref: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_number: order_number.into(),
            customer_id,
            customer_name: customer_name.into(),
            email: email.into(),
            phone: phone.into(),
            status: OrderStatus::New,
            items: vec![],
            subtotal: Money::default(),
            shipping: Money::default(),
            discount: Money::default(),
            total: Money::default(),
            shipping_address,
            payment_ref: payment_ref.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn customer_id(&self) -> Uuid { self.customer_id }
    pub fn email(&self) -> &str { &self.email }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn shipping(&self) -> &Money { &self.shipping }
    pub fn discount(&self) -> &Money { &self.discount }
    pub fn total(&self) -> &Money { &self.total }
    pub fn payment_ref(&self) -> &str { &self.payment_ref }
    pub fn shipping_address(&self) -> &ShippingAddress { &self.shipping_address }

    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.recalculate();
    }

    pub fn set_shipping_cost(&mut self, shipping: Money) {
        self.shipping = shipping;
        self.recalculate();
    }

    pub fn set_discount(&mut self, discount: Money) {
        self.discount = discount;
        self.recalculate();
    }

    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::IllegalTransition { from: self.status, to: next });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// total = subtotal + shipping − discount, never below zero.
    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Money::default(), |acc, i| acc.add(&i.total).unwrap_or(acc));
        let gross = self.subtotal.add(&self.shipping).unwrap_or_else(|_| self.subtotal.clone());
        let net = (gross.amount() - self.discount.amount()).max(Decimal::ZERO);
        self.total = Money::aed(net);
        self.touch();
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone)]
pub enum OrderError {
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalTransition { from, to } => {
                write!(f, "Cannot move order from {} to {}", from.as_str(), to.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: u32, price: i64) -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            variation_id: None,
            name: "Saudi Blend".into(),
            sku: None,
            quantity: qty,
            unit_price: Money::aed(Decimal::new(price, 0)),
            total: Money::aed(Decimal::new(price * qty as i64, 0)),
        }
    }

    fn order() -> Order {
        Order::create(
            "ORD-00001234",
            Uuid::new_v4(),
            "Maha Al Suwaidi",
            "maha@example.ae",
            "+971501234567",
            ShippingAddress { emirate: "Dubai".into(), city: "Dubai".into(), address: "Villa 12, Al Wasl Road".into() },
            "PAY-TEST",
        )
    }

    #[test]
    fn test_totals_roll_up() {
        let mut o = order();
        o.add_item(line(2, 55));
        o.add_item(line(1, 70));
        o.set_shipping_cost(Money::aed(Decimal::new(25, 0)));
        assert_eq!(o.subtotal().amount(), Decimal::new(180, 0));
        assert_eq!(o.total().amount(), Decimal::new(205, 0));
    }

    #[test]
    fn test_discount_floors_at_zero() {
        let mut o = order();
        o.add_item(line(1, 10));
        o.set_discount(Money::aed(Decimal::new(50, 0)));
        assert_eq!(o.total().amount(), Decimal::ZERO);
    }

    #[test]
    fn test_status_lifecycle() {
        let mut o = order();
        o.add_item(line(1, 10));
        assert_eq!(o.status(), OrderStatus::New);
        o.transition(OrderStatus::Processing).unwrap();
        o.transition(OrderStatus::Shipped).unwrap();
        o.transition(OrderStatus::Delivered).unwrap();
        assert!(o.transition(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn test_no_skipping_fulfilment_steps() {
        let mut o = order();
        assert!(o.transition(OrderStatus::Shipped).is_err());
        assert!(o.transition(OrderStatus::Delivered).is_err());
        o.transition(OrderStatus::Cancelled).unwrap();
        assert!(o.transition(OrderStatus::Processing).is_err());
    }
}
