#![allow(dead_code)]

use chrono::{DateTime, Utc};
use stockroom::{
    AppState, InventoryItem, InventoryStore, ItemId, NewItem, Order, OrderId, OrderLine,
    OrderLineRequest, PrincipalId, ServiceConfig,
};

pub fn state() -> AppState {
    AppState::in_memory(ServiceConfig::default())
}

pub fn principal(id: &str) -> PrincipalId {
    PrincipalId(id.to_string())
}

pub async fn seed_item(
    state: &AppState,
    owner: &PrincipalId,
    name: &str,
    quantity: u32,
    cost_price: f64,
    selling_price: f64,
) -> InventoryItem {
    state
        .inventory_service()
        .create_item(
            owner,
            NewItem {
                name: name.into(),
                quantity,
                cost_price,
                selling_price,
                ..NewItem::default()
            },
        )
        .await
        .expect("seed item")
}

pub fn line(item: &InventoryItem, qty: u32) -> OrderLineRequest {
    OrderLineRequest::new(item.id.as_str(), qty)
}

/// An inventory record with a chosen creation time, inserted through the
/// store directly so ordering tests are deterministic.
pub fn raw_item(
    id: &str,
    owner: &PrincipalId,
    name: &str,
    quantity: u32,
    cost_price: f64,
    selling_price: f64,
    created_at: DateTime<Utc>,
) -> InventoryItem {
    InventoryItem {
        id: ItemId(id.to_string()),
        owner_id: owner.clone(),
        name: name.to_string(),
        sku: None,
        category: None,
        quantity,
        cost_price,
        selling_price,
        image_url: None,
        created_at,
        updated_at: created_at,
    }
}

/// An order record with a chosen creation time, for date-window tests.
pub fn raw_order(
    id: &str,
    owner: &PrincipalId,
    lines: Vec<(ItemId, u32)>,
    total_amount: f64,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: OrderId(id.to_string()),
        owner_id: owner.clone(),
        lines: lines
            .into_iter()
            .map(|(product_id, qty)| OrderLine { product_id, qty })
            .collect(),
        total_amount,
        created_at,
    }
}

pub async fn stock_of(state: &AppState, id: &ItemId) -> u32 {
    state
        .inventory()
        .find_by_id(id)
        .await
        .expect("store read")
        .expect("item present")
        .quantity
}
