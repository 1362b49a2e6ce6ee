//! Shared application state handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::PgCatalog;
use crate::checkout::CheckoutService;
use crate::orders::PgOrderWriter;
use crate::payment::SandboxGateway;
use crate::shipping::PgRuleSource;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub nats: Option<async_nats::Client>,
    pub catalog: Arc<PgCatalog>,
    pub rules: Arc<PgRuleSource>,
    pub orders: Arc<PgOrderWriter>,
    pub checkout: CheckoutService,
}

impl AppState {
    pub fn new(db: PgPool, nats: Option<async_nats::Client>) -> Self {
        let catalog = Arc::new(PgCatalog::new(db.clone()));
        let rules = Arc::new(PgRuleSource::new(db.clone()));
        let orders = Arc::new(PgOrderWriter::new(db.clone()));
        let checkout = CheckoutService::new(
            catalog.clone(),
            rules.clone(),
            Arc::new(SandboxGateway),
            orders.clone(),
        );
        Self { db, nats, catalog, rules, orders, checkout }
    }
}
