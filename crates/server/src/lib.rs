use std::sync::Arc;

use db::DBService;
use services::services::{
    catalog::SqliteCatalog,
    config::Config,
    dialog_engine::DialogEngine,
    order::OrderService,
    slot_parser::{SlotParser, SlotParserError},
};

pub mod error;
pub mod routes;

/// Shared handles every route reads from
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    dialog: DialogEngine,
    orders: OrderService,
}

impl AppState {
    pub fn new(db: DBService, config: &Config) -> Result<Self, SlotParserError> {
        let parser = SlotParser::new(&config.brands)?;
        let catalog = Arc::new(SqliteCatalog::new(db.pool.clone()));
        let dialog = DialogEngine::new(parser, catalog, config.search_limit);
        let orders = OrderService::new(db.pool.clone(), config.order_timeout);

        Ok(Self { db, dialog, orders })
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn dialog(&self) -> &DialogEngine {
        &self.dialog
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }
}
