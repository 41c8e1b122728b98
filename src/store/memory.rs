//! In-memory document stores. Each operation takes the map's lock once,
//! so the conditional decrement's guard and write are a single atomic
//! step — the same contract a document database provides with a
//! conditional update.

use super::{DecrementOutcome, InventoryStore, OrderStore};
use crate::error::StoreError;
use crate::model::{DateRange, InventoryItem, ItemId, ItemPatch, Order, OrderId, PrincipalId};
use crate::validation::normalized;
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryInventoryStore {
    items: RwLock<IndexMap<ItemId, InventoryItem>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn insert(&self, item: InventoryItem) -> Result<InventoryItem, StoreError> {
        let mut items = self.items.write();
        if items.contains_key(&item.id) {
            return Err(StoreError::DuplicateId(item.id.to_string()));
        }
        items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self.items.read().get(id).cloned())
    }

    async fn list_by_owner(&self, owner: &PrincipalId) -> Result<Vec<InventoryItem>, StoreError> {
        let mut result: Vec<InventoryItem> = self
            .items
            .read()
            .values()
            .filter(|item| item.owner_id == *owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(
        &self,
        id: &ItemId,
        patch: &ItemPatch,
    ) -> Result<Option<InventoryItem>, StoreError> {
        let mut items = self.items.write();
        let Some(item) = items.get_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            item.name = name.trim().to_string();
        }
        if let Some(sku) = &patch.sku {
            item.sku = normalized(Some(sku.clone()));
        }
        if let Some(category) = &patch.category {
            item.category = normalized(Some(category.clone()));
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(cost_price) = patch.cost_price {
            item.cost_price = cost_price;
        }
        if let Some(selling_price) = patch.selling_price {
            item.selling_price = selling_price;
        }
        if let Some(image_url) = &patch.image_url {
            item.image_url = normalized(Some(image_url.clone()));
        }
        item.updated_at = Utc::now();

        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        Ok(self.items.write().shift_remove(id).is_some())
    }

    async fn conditional_decrement(
        &self,
        id: &ItemId,
        amount: u32,
    ) -> Result<DecrementOutcome, StoreError> {
        let mut items = self.items.write();
        let Some(item) = items.get_mut(id) else {
            return Ok(DecrementOutcome::Conflict { available: 0 });
        };
        if item.quantity < amount {
            return Ok(DecrementOutcome::Conflict {
                available: item.quantity,
            });
        }
        item.quantity -= amount;
        item.updated_at = Utc::now();
        Ok(DecrementOutcome::Applied(item.clone()))
    }

    async fn increment(&self, id: &ItemId, amount: u32) -> Result<bool, StoreError> {
        let mut items = self.items.write();
        let Some(item) = items.get_mut(id) else {
            return Ok(false);
        };
        item.quantity = item.quantity.saturating_add(amount);
        item.updated_at = Utc::now();
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<IndexMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write();
        if orders.contains_key(&order.id) {
            return Err(StoreError::DuplicateId(order.id.to_string()));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn list_by_owner(
        &self,
        owner: &PrincipalId,
        range: DateRange,
    ) -> Result<Vec<Order>, StoreError> {
        let mut result: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|order| order.owner_id == *owner && range.contains(order.created_at))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderLine;
    use assert_matches::assert_matches;

    fn item(id: &str, owner: &str, quantity: u32) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: ItemId(id.into()),
            owner_id: PrincipalId(owner.into()),
            name: format!("item {id}"),
            sku: None,
            category: None,
            quantity,
            cost_price: 1.0,
            selling_price: 2.0,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn decrement_applies_only_while_guard_holds() {
        let store = MemoryInventoryStore::new();
        let id = ItemId("itm-1".into());
        store.insert(item("itm-1", "usr-1", 3)).await.unwrap();

        let outcome = store.conditional_decrement(&id, 2).await.unwrap();
        assert_matches!(outcome, DecrementOutcome::Applied(updated) if updated.quantity == 1);

        let outcome = store.conditional_decrement(&id, 2).await.unwrap();
        assert_eq!(outcome, DecrementOutcome::Conflict { available: 1 });

        // quantity untouched by the failed attempt
        let current = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(current.quantity, 1);
    }

    #[tokio::test]
    async fn decrement_of_missing_record_reports_zero_available() {
        let store = MemoryInventoryStore::new();
        let outcome = store
            .conditional_decrement(&ItemId("itm-gone".into()), 1)
            .await
            .unwrap();
        assert_eq!(outcome, DecrementOutcome::Conflict { available: 0 });
    }

    #[tokio::test]
    async fn increment_restores_stock_and_reports_missing_records() {
        let store = MemoryInventoryStore::new();
        let id = ItemId("itm-1".into());
        store.insert(item("itm-1", "usr-1", 5)).await.unwrap();

        store.conditional_decrement(&id, 5).await.unwrap();
        assert!(store.increment(&id, 5).await.unwrap());
        assert_eq!(store.find_by_id(&id).await.unwrap().unwrap().quantity, 5);

        assert!(!store.increment(&ItemId("itm-gone".into()), 1).await.unwrap());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = MemoryInventoryStore::new();
        store.insert(item("itm-1", "usr-1", 1)).await.unwrap();
        let err = store.insert(item("itm-1", "usr-1", 1)).await.unwrap_err();
        assert_matches!(err, StoreError::DuplicateId(id) if id == "itm-1");
    }

    #[tokio::test]
    async fn update_writes_only_supplied_fields_and_trims() {
        let store = MemoryInventoryStore::new();
        let id = ItemId("itm-1".into());
        store.insert(item("itm-1", "usr-1", 4)).await.unwrap();

        let patch = ItemPatch {
            sku: Some("  ACME-9 ".into()),
            selling_price: Some(3.5),
            ..ItemPatch::default()
        };
        let updated = store.update(&id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.sku.as_deref(), Some("ACME-9"));
        assert_eq!(updated.selling_price, 3.5);
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.name, "item itm-1");

        assert!(
            store
                .update(&ItemId("itm-gone".into()), &patch)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn orders_list_is_owner_scoped_and_newest_first() {
        let store = MemoryOrderStore::new();
        let base = Utc::now();
        for (idx, owner) in [(0, "usr-1"), (1, "usr-1"), (2, "usr-2")] {
            store
                .insert(Order {
                    id: OrderId(format!("ord-{idx}")),
                    owner_id: PrincipalId(owner.into()),
                    lines: vec![OrderLine {
                        product_id: ItemId("itm-1".into()),
                        qty: 1,
                    }],
                    total_amount: 2.0,
                    created_at: base + chrono::Duration::seconds(idx),
                })
                .await
                .unwrap();
        }

        let mine = store
            .list_by_owner(&PrincipalId("usr-1".into()), DateRange::all())
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id.as_str(), "ord-1");
        assert_eq!(mine[1].id.as_str(), "ord-0");
    }
}
