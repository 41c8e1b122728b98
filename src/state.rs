//! Composition root. Bundles the resolved configuration and the two
//! stores; the (out-of-scope) request-handling layer holds one `AppState`
//! and hands out services per request.

use crate::config::ServiceConfig;
use crate::service::inventory::InventoryService;
use crate::service::orders::OrderService;
use crate::service::reports::ReportService;
use crate::store::{InventoryStore, MemoryInventoryStore, MemoryOrderStore, OrderStore};
use std::sync::Arc;

pub struct AppState {
    config: Arc<ServiceConfig>,
    inventory: Arc<dyn InventoryStore>,
    orders: Arc<dyn OrderStore>,
}

impl AppState {
    /// State backed by the in-memory reference stores.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryInventoryStore::new()),
            Arc::new(MemoryOrderStore::new()),
        )
    }

    /// State over caller-supplied store backends.
    pub fn with_stores(
        config: ServiceConfig,
        inventory: Arc<dyn InventoryStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            inventory,
            orders,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn inventory(&self) -> Arc<dyn InventoryStore> {
        self.inventory.clone()
    }

    pub fn orders(&self) -> Arc<dyn OrderStore> {
        self.orders.clone()
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            self.config.clone(),
            self.inventory.clone(),
            self.orders.clone(),
        )
    }

    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(self.inventory.clone())
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.inventory.clone(), self.orders.clone())
    }
}
