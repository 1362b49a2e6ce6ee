//! Checkout orchestration: server-side repricing, shipping, payment, order
//! write.
//!
//! Totals are always recomputed from the catalog; the amounts the client
//! displayed are never trusted for the charge. Collaborators sit behind
//! traits so the whole flow runs against in-memory fakes in tests.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::checkout::forms::{validate_customer, validate_shipping, CustomerInfo, ShippingInfo};
use crate::domain::aggregates::product::{resolve_variation, VariationSelection};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::CURRENCY;
use crate::error::StoreError;
use crate::orders::{OrderDraft, OrderReceipt, OrderWriter};
use crate::payment::PaymentGateway;
use crate::pricing::PricedItem;
use crate::shipping::{calculate_shipping, RuleSource, ShippingRule};

#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutItemRequest {
    pub product_id: Uuid,
    pub selection: Option<VariationSelection>,
    pub quantity: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
    pub items: Vec<CheckoutItemRequest>,
    pub payment_method: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub shipping_rule: Option<ShippingRule>,
}

#[derive(Debug, Serialize)]
pub struct PlacedOrder {
    pub receipt: OrderReceipt,
    pub totals: CheckoutTotals,
    #[serde(skip)]
    pub events: Vec<DomainEvent>,
}

#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn Catalog>,
    rules: Arc<dyn RuleSource>,
    gateway: Arc<dyn PaymentGateway>,
    writer: Arc<dyn OrderWriter>,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        rules: Arc<dyn RuleSource>,
        gateway: Arc<dyn PaymentGateway>,
        writer: Arc<dyn OrderWriter>,
    ) -> Self {
        Self { catalog, rules, gateway, writer }
    }

    /// Reprice every line from the catalog. Unknown products, unresolvable
    /// variations and short stock all fail here, before any money moves.
    async fn price_items(&self, items: &[CheckoutItemRequest]) -> Result<Vec<PricedItem>, StoreError> {
        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                return Err(StoreError::BadRequest("quantity must be at least 1".into()));
            }
            let product = self
                .catalog
                .product_by_id(item.product_id)
                .await?
                .filter(|p| p.is_purchasable())
                .ok_or(StoreError::ProductNotFound)?;
            let variations = self.catalog.variations_of(product.id).await?;
            let has_active = variations.iter().any(|v| v.is_active);

            let (variation_id, sku, unit_price) = match &item.selection {
                Some(selection) => {
                    let variation =
                        resolve_variation(&variations, selection).ok_or(StoreError::VariationNotFound)?;
                    if !variation.in_stock(item.quantity) {
                        return Err(StoreError::InsufficientStock);
                    }
                    (
                        Some(variation.id),
                        variation.sku.clone().or_else(|| product.sku.clone()),
                        product.unit_price(variation),
                    )
                }
                None if has_active => {
                    // Size is a required dimension when the product sells in
                    // variations; there is no default substitution.
                    return Err(StoreError::VariationNotFound);
                }
                None => (None, product.sku.clone(), product.base_unit_price()),
            };

            let unit_price = unit_price.round_dp(2);
            priced.push(PricedItem {
                product_id: product.id,
                variation_id,
                name: product.name.en.clone(),
                sku,
                quantity: item.quantity,
                unit_price,
                line_total: unit_price * Decimal::from(item.quantity),
            });
        }
        Ok(priced)
    }

    async fn totals_for(&self, priced: &[PricedItem], city: Option<&str>) -> CheckoutTotals {
        let subtotal: Decimal = priced.iter().map(|i| i.line_total).sum();
        let quote = calculate_shipping(subtotal, priced, city, self.rules.as_ref()).await;
        // Coupon entry is a storefront stub; order-level discounts stay zero
        // while per-item catalog discounts are already inside unit prices.
        let discount_total = Decimal::ZERO;
        let total = (subtotal + quote.cost - discount_total).round_dp(2);
        CheckoutTotals {
            subtotal,
            shipping_cost: quote.cost,
            discount_total,
            total,
            shipping_rule: quote.rule,
        }
    }

    /// Totals preview for the running checkout UI.
    pub async fn quote(
        &self,
        items: &[CheckoutItemRequest],
        city: Option<&str>,
    ) -> Result<CheckoutTotals, StoreError> {
        if items.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        let priced = self.price_items(items).await?;
        Ok(self.totals_for(&priced, city).await)
    }

    /// The full checkout: validate both form steps, reprice, quote shipping,
    /// authorize the charge, persist the order. A gateway decline surfaces
    /// its message verbatim; a persistence failure after capture is the
    /// manual-reconciliation case and comes back as the generic
    /// order-creation failure.
    pub async fn place_order(&self, req: CheckoutRequest) -> Result<PlacedOrder, StoreError> {
        validate_customer(&req.customer).map_err(StoreError::Validation)?;
        validate_shipping(&req.shipping).map_err(StoreError::Validation)?;
        if req.items.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let priced = self.price_items(&req.items).await?;
        let totals = self.totals_for(&priced, Some(&req.shipping.city)).await;

        let intent = self
            .gateway
            .create_intent(totals.total, CURRENCY, &req.customer.email)
            .await
            .map_err(|e| StoreError::Payment(e.0))?;
        let confirmation = self
            .gateway
            .confirm(&intent.client_secret, &req.payment_method)
            .await
            .map_err(|e| StoreError::Payment(e.0))?;

        let draft = OrderDraft {
            customer: req.customer.clone(),
            shipping: req.shipping.clone(),
            items: priced,
            subtotal: totals.subtotal,
            shipping_cost: totals.shipping_cost,
            discount_total: totals.discount_total,
            total: totals.total,
            payment_ref: confirmation.reference.clone(),
        };
        let receipt = self.writer.create_order(&draft).await.map_err(|e| {
            tracing::error!(
                error = %e,
                payment_ref = %confirmation.reference,
                email = %req.customer.email,
                "order persistence failed after payment capture, manual reconciliation required"
            );
            StoreError::OrderCreationFailed
        })?;

        let mut events = vec![DomainEvent::OrderPlaced {
            order_id: receipt.order_id,
            order_number: receipt.order_number.clone(),
            email: req.customer.email.clone(),
            total: receipt.total,
        }];
        if receipt.is_new_customer {
            events.push(DomainEvent::CustomerRegistered {
                customer_id: receipt.customer_id,
                email: req.customer.email.clone(),
                full_name: req.customer.full_name.clone(),
            });
        }

        Ok(PlacedOrder { receipt, totals, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::domain::aggregates::product::{Product, ProductStatus, Variation};
    use crate::domain::aggregates::OrderStatus;
    use crate::domain::value_objects::LocalizedText;
    use crate::payment::{PaymentConfirmation, PaymentDeclined, PaymentIntent, SandboxGateway};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    struct OfflineRules;
    #[async_trait]
    impl RuleSource for OfflineRules {
        async fn active_rules(&self) -> anyhow::Result<Vec<ShippingRule>> {
            anyhow::bail!("rule service offline")
        }
    }

    #[derive(Default)]
    struct MemoryWriter {
        known_emails: Mutex<Vec<String>>,
        orders: Mutex<Vec<OrderDraft>>,
        fail: bool,
    }

    #[async_trait]
    impl OrderWriter for MemoryWriter {
        async fn create_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, StoreError> {
            if self.fail {
                return Err(StoreError::Database(sqlx::Error::PoolClosed));
            }
            let email = draft.customer.email.to_lowercase();
            let mut known = self.known_emails.lock().unwrap();
            let is_new_customer = !known.contains(&email);
            if is_new_customer {
                known.push(email);
            }
            self.orders.lock().unwrap().push(draft.clone());
            Ok(OrderReceipt {
                order_id: Uuid::new_v4(),
                order_number: "ORD-00000042".into(),
                customer_id: Uuid::new_v4(),
                is_new_customer,
                total: draft.total,
                status: OrderStatus::New,
            })
        }
    }

    struct DecliningGateway;
    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        async fn create_intent(&self, amount: Decimal, currency: &str, _email: &str) -> Result<PaymentIntent, PaymentDeclined> {
            Ok(PaymentIntent { client_secret: "cs".into(), amount, currency: currency.into() })
        }
        async fn confirm(&self, _secret: &str, _method: &str) -> Result<PaymentConfirmation, PaymentDeclined> {
            Err(PaymentDeclined("card_declined: insufficient funds".into()))
        }
    }

    fn product(price_aed: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            sku: Some("QHW-ESP".into()),
            name: LocalizedText::new("Espresso Blend", "خلطة إسبريسو"),
            slug: "espresso-blend".into(),
            description: LocalizedText::default(),
            price: Decimal::new(price_aed, 0),
            discount_value: None,
            discount_kind: None,
            category_id: None,
            status: ProductStatus::Active,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(product_id: Uuid, selection: Option<VariationSelection>, qty: u32) -> CheckoutRequest {
        CheckoutRequest {
            customer: CustomerInfo {
                full_name: "Maha Al Suwaidi".into(),
                email: "maha@example.ae".into(),
                phone: "+971501234567".into(),
            },
            shipping: ShippingInfo {
                emirate: "Dubai".into(),
                city: "Dubai".into(),
                address: "Villa 12, Al Wasl Road".into(),
            },
            items: vec![CheckoutItemRequest { product_id, selection, quantity: qty }],
            payment_method: "card".into(),
        }
    }

    fn service(catalog: MemoryCatalog, writer: MemoryWriter) -> (CheckoutService, Arc<MemoryWriter>) {
        let writer = Arc::new(writer);
        let svc = CheckoutService::new(
            Arc::new(catalog),
            Arc::new(OfflineRules),
            Arc::new(SandboxGateway),
            writer.clone(),
        );
        (svc, writer)
    }

    #[tokio::test]
    async fn test_offline_rules_end_to_end() {
        // 180 AED subtotal, rule service down: fallback 25 AED shipping,
        // 205 total, order lands with status NEW for a first-time email.
        let p = product(90);
        let pid = p.id;
        let (svc, writer) = service(MemoryCatalog { products: vec![p], variations: vec![] }, MemoryWriter::default());

        let placed = svc.place_order(request(pid, None, 2)).await.unwrap();
        assert_eq!(placed.totals.subtotal, Decimal::new(180, 0));
        assert_eq!(placed.totals.shipping_cost, Decimal::new(25, 0));
        assert_eq!(placed.totals.total, Decimal::new(205, 0));
        assert_eq!(placed.receipt.status, OrderStatus::New);
        assert!(placed.receipt.is_new_customer);
        assert_eq!(writer.orders.lock().unwrap().len(), 1);
        assert!(placed.events.iter().any(|e| matches!(e, DomainEvent::CustomerRegistered { .. })));

        // Second order from the same email links to the existing customer.
        let placed = svc.place_order(request(pid, None, 1)).await.unwrap();
        assert!(!placed.receipt.is_new_customer);
    }

    #[tokio::test]
    async fn test_server_prices_win_over_client_snapshot() {
        // The request never carries prices at all; whatever the client
        // displayed, the charge comes from the catalog.
        let p = product(55);
        let pid = p.id;
        let (svc, _) = service(MemoryCatalog { products: vec![p], variations: vec![] }, MemoryWriter::default());
        let placed = svc.place_order(request(pid, None, 1)).await.unwrap();
        assert_eq!(placed.totals.subtotal, Decimal::new(55, 0));
    }

    #[tokio::test]
    async fn test_variation_required_when_product_has_variations() {
        let p = product(55);
        let pid = p.id;
        let size = Uuid::new_v4();
        let variation = Variation {
            id: Uuid::new_v4(),
            product_id: pid,
            size_id: size,
            flavor_id: None,
            beans_id: None,
            price: Some(Decimal::new(95, 0)),
            discount_value: None,
            discount_kind: None,
            stock: 3,
            sku: None,
            is_active: true,
        };
        let (svc, _) = service(
            MemoryCatalog { products: vec![p], variations: vec![variation] },
            MemoryWriter::default(),
        );

        let err = svc.place_order(request(pid, None, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::VariationNotFound));

        // Wrong dimension combination fails loudly too.
        let wrong = VariationSelection { size_id: Uuid::new_v4(), flavor_id: None, beans_id: None };
        let err = svc.place_order(request(pid, Some(wrong), 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::VariationNotFound));

        // The exact combination resolves and the variation price overrides.
        let sel = VariationSelection { size_id: size, flavor_id: None, beans_id: None };
        let placed = svc.place_order(request(pid, Some(sel.clone()), 2)).await.unwrap();
        assert_eq!(placed.totals.subtotal, Decimal::new(190, 0));

        // Stock short by one.
        let err = svc.place_order(request(pid, Some(sel), 4)).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (svc, _) = service(MemoryCatalog::default(), MemoryWriter::default());
        let mut req = request(Uuid::new_v4(), None, 1);
        req.items.clear();
        let err = svc.place_order(req).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyCart));
    }

    #[tokio::test]
    async fn test_invalid_forms_block_before_pricing() {
        let (svc, writer) = service(MemoryCatalog::default(), MemoryWriter::default());
        let mut req = request(Uuid::new_v4(), None, 1);
        req.shipping.address = "Villa 5".into();
        let err = svc.place_order(req).await.unwrap_err();
        match err {
            StoreError::Validation(fields) => assert_eq!(fields[0].message_key, "complete_address"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(writer.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_decline_surfaces_verbatim_and_writes_nothing() {
        let p = product(90);
        let pid = p.id;
        let writer = Arc::new(MemoryWriter::default());
        let svc = CheckoutService::new(
            Arc::new(MemoryCatalog { products: vec![p], variations: vec![] }),
            Arc::new(OfflineRules),
            Arc::new(DecliningGateway),
            writer.clone(),
        );
        let err = svc.place_order(request(pid, None, 1)).await.unwrap_err();
        match err {
            StoreError::Payment(msg) => assert_eq!(msg, "card_declined: insufficient funds"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(writer.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_after_capture_is_generic() {
        let p = product(90);
        let pid = p.id;
        let (svc, _) = service(
            MemoryCatalog { products: vec![p], variations: vec![] },
            MemoryWriter { fail: true, ..MemoryWriter::default() },
        );
        let err = svc.place_order(request(pid, None, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::OrderCreationFailed));
    }

    #[tokio::test]
    async fn test_quote_uses_fallback_threshold() {
        let p = product(100);
        let pid = p.id;
        let (svc, _) = service(MemoryCatalog { products: vec![p], variations: vec![] }, MemoryWriter::default());
        let items = vec![CheckoutItemRequest { product_id: pid, selection: None, quantity: 2 }];
        let totals = svc.quote(&items, Some("Dubai")).await.unwrap();
        assert_eq!(totals.subtotal, Decimal::new(200, 0));
        assert_eq!(totals.shipping_cost, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(200, 0));
    }
}
