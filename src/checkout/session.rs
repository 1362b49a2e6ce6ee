//! Checkout step state machine.
//!
//! Three ordered steps, forward transitions only through validated
//! submissions, back transitions to the previous step. The payment step is
//! reachable only after both earlier steps validated.

use serde::{Deserialize, Serialize};

use crate::checkout::forms::{validate_customer, validate_shipping, CustomerInfo, ShippingInfo};
use crate::domain::aggregates::Cart;
use crate::error::{FieldError, StoreError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    CustomerInfo,
    ShippingInfo,
    Payment,
}

#[derive(Clone, Debug, Default)]
pub struct CheckoutSession {
    step: CheckoutStep,
    customer: Option<CustomerInfo>,
    shipping_draft: ShippingInfo,
    shipping: Option<ShippingInfo>,
    order_completed: bool,
}

impl CheckoutSession {
    /// Entry guard: checkout never starts over an empty cart. The completed
    /// flag covers the moment right after order placement, when the cart has
    /// already been cleared but the session is still rendering confirmation.
    pub fn begin(cart: &Cart, order_completed: bool) -> Result<Self, StoreError> {
        if cart.is_empty() && !order_completed {
            return Err(StoreError::EmptyCart);
        }
        Ok(Self { order_completed, ..Self::default() })
    }

    pub fn step(&self) -> CheckoutStep { self.step }
    pub fn customer(&self) -> Option<&CustomerInfo> { self.customer.as_ref() }
    pub fn shipping(&self) -> Option<&ShippingInfo> { self.shipping.as_ref() }
    pub fn is_completed(&self) -> bool { self.order_completed }

    /// Valid submission advances to the shipping step; failures keep the
    /// session where it is and report per-field keys.
    pub fn submit_customer(&mut self, info: CustomerInfo) -> Result<(), Vec<FieldError>> {
        if self.step != CheckoutStep::CustomerInfo {
            return Err(vec![FieldError::new("step", "invalid_step")]);
        }
        validate_customer(&info)?;
        self.customer = Some(info);
        self.step = CheckoutStep::ShippingInfo;
        Ok(())
    }

    /// Choosing an emirate resets any previously chosen city; the city list
    /// is keyed by emirate.
    pub fn select_emirate(&mut self, emirate: impl Into<String>) {
        let emirate = emirate.into();
        if self.shipping_draft.emirate != emirate {
            self.shipping_draft.city.clear();
        }
        self.shipping_draft.emirate = emirate;
    }

    pub fn select_city(&mut self, city: impl Into<String>) {
        self.shipping_draft.city = city.into();
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.shipping_draft.address = address.into();
    }

    pub fn shipping_draft(&self) -> &ShippingInfo { &self.shipping_draft }

    /// Valid submission advances to the payment step.
    pub fn submit_shipping(&mut self) -> Result<(), Vec<FieldError>> {
        if self.step != CheckoutStep::ShippingInfo {
            return Err(vec![FieldError::new("step", "invalid_step")]);
        }
        validate_shipping(&self.shipping_draft)?;
        self.shipping = Some(self.shipping_draft.clone());
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Back transition from shipping/payment to the previous step.
    pub fn back(&mut self) {
        self.step = match self.step {
            CheckoutStep::CustomerInfo | CheckoutStep::ShippingInfo => CheckoutStep::CustomerInfo,
            CheckoutStep::Payment => CheckoutStep::ShippingInfo,
        };
    }

    /// The order writer confirmed; the caller clears the cart afterwards.
    pub fn mark_completed(&mut self) {
        self.order_completed = true;
    }
}
