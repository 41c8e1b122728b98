//! Owner-scoped inventory CRUD. Every operation checks ownership against
//! the supplied principal; quantity is only ever written here through an
//! explicit edit, never as a side effect.

use crate::error::ServiceError;
use crate::model::{InventoryItem, ItemId, ItemPatch, NewItem, PrincipalId};
use crate::store::InventoryStore;
use crate::validation::{self, normalized};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct InventoryService {
    inventory: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(inventory: Arc<dyn InventoryStore>) -> Self {
        Self { inventory }
    }

    /// The caller's items, newest first.
    pub async fn list_items(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<InventoryItem>, ServiceError> {
        Ok(self.inventory.list_by_owner(principal).await?)
    }

    #[instrument(skip(self, new), fields(principal = %principal))]
    pub async fn create_item(
        &self,
        principal: &PrincipalId,
        new: NewItem,
    ) -> Result<InventoryItem, ServiceError> {
        validation::validate_new_item(&new)?;

        let now = Utc::now();
        let item = InventoryItem {
            id: ItemId::generate(),
            owner_id: principal.clone(),
            name: new.name.trim().to_string(),
            sku: normalized(new.sku),
            category: normalized(new.category),
            quantity: new.quantity,
            cost_price: new.cost_price,
            selling_price: new.selling_price,
            image_url: normalized(new.image_url),
            created_at: now,
            updated_at: now,
        };
        let item = self.inventory.insert(item).await?;
        info!(item_id = %item.id, name = %item.name, "inventory item created");
        Ok(item)
    }

    /// Apply a partial update. Only fields present in the patch are
    /// written; a quantity supplied here is an absolute edit, outside the
    /// reservation protocol.
    #[instrument(skip(self, patch), fields(principal = %principal, item_id = %id))]
    pub async fn update_item(
        &self,
        principal: &PrincipalId,
        id: &ItemId,
        patch: ItemPatch,
    ) -> Result<InventoryItem, ServiceError> {
        validation::validate_item_patch(&patch)?;

        let current = self
            .inventory
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                product_id: id.to_string(),
            })?;
        if current.owner_id != *principal {
            return Err(ServiceError::Forbidden { name: current.name });
        }

        self.inventory
            .update(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                product_id: id.to_string(),
            })
    }

    /// Delete an owned item. Orders that reference it keep their line as
    /// a dangling reference; reporting renders it as a deleted product.
    #[instrument(skip(self), fields(principal = %principal, item_id = %id))]
    pub async fn delete_item(
        &self,
        principal: &PrincipalId,
        id: &ItemId,
    ) -> Result<(), ServiceError> {
        let current = self
            .inventory
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                product_id: id.to_string(),
            })?;
        if current.owner_id != *principal {
            return Err(ServiceError::Forbidden { name: current.name });
        }

        if !self.inventory.delete(id).await? {
            return Err(ServiceError::NotFound {
                product_id: id.to_string(),
            });
        }
        info!(item_id = %id, "inventory item deleted");
        Ok(())
    }
}
