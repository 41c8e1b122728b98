//! Order placement and stock reservation core for a small-business
//! inventory backend.
//!
//! The crate is the service layer beneath an HTTP surface that is out of
//! scope here: callers authenticate a principal, parse a request body, and
//! invoke [`OrderService::place_order`] or one of the CRUD/report
//! operations. Stock is reserved per line item with a conditional
//! decrement against the inventory store; a lost race rolls back every
//! decrement that did apply before the failure is surfaced.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;

pub use config::ServiceConfig;
pub use error::{ServiceError, StoreError};
pub use logging::{LoggingConfig, init_logging};
pub use model::{
    DateRange, InventoryItem, ItemId, ItemPatch, NewItem, Order, OrderId, OrderLine,
    OrderLineRequest, PrincipalId,
};
pub use service::inventory::InventoryService;
pub use service::orders::OrderService;
pub use service::reports::ReportService;
pub use state::AppState;
pub use store::{DecrementOutcome, InventoryStore, OrderStore};
