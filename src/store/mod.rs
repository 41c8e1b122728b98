//! Persistence boundary. The services speak to these traits only; the
//! in-memory implementations in [`memory`] are the reference backends and
//! double as the test harness.

mod memory;

pub use memory::{MemoryInventoryStore, MemoryOrderStore};

use crate::error::StoreError;
use crate::model::{DateRange, InventoryItem, ItemId, ItemPatch, Order, PrincipalId};
use async_trait::async_trait;

/// Result of a conditional decrement against one inventory record.
#[derive(Debug, Clone, PartialEq)]
pub enum DecrementOutcome {
    /// The guard held and the decrement was applied atomically; carries
    /// the updated record.
    Applied(InventoryItem),
    /// The guard failed: stored quantity was below the requested amount
    /// at the instant of the write. A record that no longer exists
    /// reports `available: 0`.
    Conflict { available: u32 },
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert(&self, item: InventoryItem) -> Result<InventoryItem, StoreError>;

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<InventoryItem>, StoreError>;

    /// All items belonging to `owner`, newest first.
    async fn list_by_owner(&self, owner: &PrincipalId) -> Result<Vec<InventoryItem>, StoreError>;

    /// Apply the supplied fields of `patch` in one atomic write. Returns
    /// the updated record, or `None` when the id is unknown.
    async fn update(
        &self,
        id: &ItemId,
        patch: &ItemPatch,
    ) -> Result<Option<InventoryItem>, StoreError>;

    /// Returns false when the id was unknown.
    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError>;

    /// Decrement quantity by `amount` only if the stored quantity is at
    /// least `amount` at the instant of the write. The guard and the
    /// write are one atomic step; `Conflict` is the authoritative "did
    /// not apply" signal and must never be derived from a re-read.
    async fn conditional_decrement(
        &self,
        id: &ItemId,
        amount: u32,
    ) -> Result<DecrementOutcome, StoreError>;

    /// Compensating increment for a decrement that must be undone.
    /// Returns false when the record no longer exists, in which case
    /// there is no stock left to restore.
    async fn increment(&self, id: &ItemId, amount: u32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;

    /// Orders belonging to `owner` with creation time inside `range`,
    /// newest first.
    async fn list_by_owner(
        &self,
        owner: &PrincipalId,
        range: DateRange,
    ) -> Result<Vec<Order>, StoreError>;
}
