//! Order placement: validate, resolve, price, reserve, commit.
//!
//! Stock is reserved with one conditional decrement per line item. The
//! decrements are independent writes, not a cross-record transaction; a
//! lost race is repaired by compensating increments on every decrement
//! that did apply before the failure is reported. The mutation phase runs
//! on a spawned task so the compensation completes even when the caller
//! disconnects mid-flight.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, StoreError};
use crate::metrics::METRICS;
use crate::model::{
    DateRange, InventoryItem, ItemId, Order, OrderId, OrderLine, OrderLineRequest, OrderLineView,
    OrderView, PrincipalId,
};
use crate::store::{DecrementOutcome, InventoryStore, OrderStore};
use crate::utils::round_currency;
use crate::validation;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

pub struct OrderService {
    config: Arc<ServiceConfig>,
    inventory: Arc<dyn InventoryStore>,
    orders: Arc<dyn OrderStore>,
}

struct ResolvedLine {
    item: InventoryItem,
    qty: u32,
}

impl OrderService {
    pub fn new(
        config: Arc<ServiceConfig>,
        inventory: Arc<dyn InventoryStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            config,
            inventory,
            orders,
        }
    }

    /// Place an order for `principal`. Either exactly one order is
    /// created with every requested quantity reserved, or no order is
    /// created and net stock is unchanged. The total is always computed
    /// here from current selling prices; nothing the caller sends can
    /// influence it.
    #[instrument(skip(self, lines), fields(principal = %principal, line_count = lines.len()))]
    pub async fn place_order(
        &self,
        principal: &PrincipalId,
        lines: &[OrderLineRequest],
    ) -> Result<Order, ServiceError> {
        let started = Instant::now();
        let result = self.place_order_inner(principal, lines).await;

        match &result {
            Ok(order) => {
                METRICS.record_placement("committed");
                info!(
                    order_id = %order.id,
                    total_amount = order.total_amount,
                    lines = order.lines.len(),
                    "order committed"
                );
            }
            Err(err) => {
                METRICS.record_placement(err.kind());
                warn!(error = %err, category = err.category(), "order rejected");
            }
        }
        METRICS
            .order_placement_duration_seconds
            .observe(started.elapsed().as_secs_f64());

        result
    }

    async fn place_order_inner(
        &self,
        principal: &PrincipalId,
        lines: &[OrderLineRequest],
    ) -> Result<Order, ServiceError> {
        validation::validate_line_items(lines, self.config.max_line_items)?;

        // Read phase: resolve every line before touching anything.
        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            let product_id = ItemId(line.product_id.trim().to_string());
            let item = self
                .inventory
                .find_by_id(&product_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound {
                    product_id: product_id.to_string(),
                })?;

            if item.owner_id != *principal {
                return Err(ServiceError::Forbidden { name: item.name });
            }

            // Optimistic pre-check; the conditional decrement below is
            // the true guard under concurrency.
            if item.quantity < line.qty {
                return Err(ServiceError::InsufficientStock {
                    name: item.name,
                    available: item.quantity,
                    requested: line.qty,
                });
            }

            resolved.push(ResolvedLine {
                item,
                qty: line.qty,
            });
        }

        let total_amount = order_total(resolved.iter().map(|l| (l.item.selling_price, l.qty)));

        // The mutation phase must run to completion even if the caller's
        // future is dropped, so its compensation path cannot be skipped.
        let task = reserve_and_commit(
            self.inventory.clone(),
            self.orders.clone(),
            self.config.clone(),
            principal.clone(),
            resolved,
            total_amount,
        );
        match tokio::spawn(task).await {
            Ok(result) => result,
            Err(join_err) => Err(ServiceError::Store(StoreError::Unavailable(format!(
                "order placement task failed: {join_err}"
            )))),
        }
    }

    /// The caller's orders, newest first, optionally windowed on
    /// creation time.
    pub async fn list_orders(
        &self,
        principal: &PrincipalId,
        range: DateRange,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.list_by_owner(principal, range).await?)
    }

    /// Like [`Self::list_orders`], with line names resolved against
    /// current inventory. A deleted product resolves to `None` so a
    /// rendering layer can show it as such instead of failing.
    pub async fn order_history(
        &self,
        principal: &PrincipalId,
        range: DateRange,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let orders = self.orders.list_by_owner(principal, range).await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let mut items = Vec::with_capacity(order.lines.len());
            for line in &order.lines {
                let product_name = self
                    .inventory
                    .find_by_id(&line.product_id)
                    .await?
                    .map(|item| item.name);
                items.push(OrderLineView {
                    product_id: line.product_id.clone(),
                    qty: line.qty,
                    product_name,
                });
            }
            views.push(OrderView {
                id: order.id,
                items,
                total_amount: order.total_amount,
                created_at: order.created_at,
            });
        }
        Ok(views)
    }
}

/// Authoritative order total: Σ price × qty, rounded to two decimals.
pub(crate) fn order_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, u32)>,
{
    round_currency(
        lines
            .into_iter()
            .map(|(price, qty)| price * f64::from(qty))
            .sum(),
    )
}

async fn reserve_and_commit(
    inventory: Arc<dyn InventoryStore>,
    orders: Arc<dyn OrderStore>,
    config: Arc<ServiceConfig>,
    owner: PrincipalId,
    resolved: Vec<ResolvedLine>,
    total_amount: f64,
) -> Result<Order, ServiceError> {
    // Reservation phase: one independent conditional decrement per line.
    let outcomes = join_all(resolved.iter().map(|line| {
        let inventory = inventory.clone();
        let id = line.item.id.clone();
        let qty = line.qty;
        async move { inventory.conditional_decrement(&id, qty).await }
    }))
    .await;

    let mut applied: Vec<usize> = Vec::new();
    let mut conflict: Option<(usize, u32)> = None;
    let mut store_error: Option<StoreError> = None;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(DecrementOutcome::Applied(_)) => applied.push(index),
            Ok(DecrementOutcome::Conflict { available }) => {
                if conflict.is_none() {
                    conflict = Some((index, available));
                }
            }
            Err(err) => {
                if store_error.is_none() {
                    store_error = Some(err);
                }
            }
        }
    }

    if conflict.is_some() || store_error.is_some() {
        roll_back(inventory.as_ref(), &config, &resolved, &applied).await?;

        if let Some(err) = store_error {
            return Err(ServiceError::Store(err));
        }
        let (index, available) = conflict.expect("conflict present when no store error");
        let line = &resolved[index];
        METRICS.stock_conflicts_total.inc();
        warn!(
            product_id = %line.item.id,
            requested = line.qty,
            available,
            "reservation lost to a concurrent order"
        );
        return Err(ServiceError::InsufficientStock {
            name: line.item.name.clone(),
            available,
            requested: line.qty,
        });
    }

    // Commit phase: exactly one order, carrying the original pairs.
    let order = Order {
        id: OrderId::generate(),
        owner_id: owner,
        lines: resolved
            .iter()
            .map(|line| OrderLine {
                product_id: line.item.id.clone(),
                qty: line.qty,
            })
            .collect(),
        total_amount,
        created_at: Utc::now(),
    };

    match orders.insert(order).await {
        Ok(order) => Ok(order),
        Err(err) => {
            // The reservation succeeded but the order record did not
            // persist; restore every decrement before reporting.
            roll_back(inventory.as_ref(), &config, &resolved, &applied).await?;
            Err(ServiceError::Store(err))
        }
    }
}

/// Undo the decrements listed in `applied`. Every compensating increment
/// is attempted even when an earlier one fails; the first exhausted
/// retry is reported.
async fn roll_back(
    inventory: &dyn InventoryStore,
    config: &ServiceConfig,
    resolved: &[ResolvedLine],
    applied: &[usize],
) -> Result<(), ServiceError> {
    let results = join_all(applied.iter().map(|&index| {
        let line = &resolved[index];
        async move {
            (
                index,
                restore_with_retry(inventory, config, &line.item.id, line.qty).await,
            )
        }
    }))
    .await;

    for (index, restored) in results {
        if !restored {
            let line = &resolved[index];
            return Err(ServiceError::RollbackFailure {
                product_id: line.item.id.clone(),
                amount: line.qty,
            });
        }
    }
    Ok(())
}

async fn restore_with_retry(
    inventory: &dyn InventoryStore,
    config: &ServiceConfig,
    id: &ItemId,
    amount: u32,
) -> bool {
    for attempt in 0..=config.rollback_retry_attempts {
        if attempt > 0 {
            METRICS.rollback_retries_total.inc();
            tokio::time::sleep(config.rollback_retry_delay()).await;
        }
        match inventory.increment(id, amount).await {
            // A record deleted mid-flight has no stock left to restore.
            Ok(_) => return true,
            Err(err) => {
                warn!(
                    product_id = %id,
                    amount,
                    attempt,
                    error = %err,
                    "compensating increment failed"
                );
            }
        }
    }

    METRICS.rollback_failures_total.inc();
    error!(
        product_id = %id,
        amount,
        "compensating increment exhausted retries; stock under-counted, manual reconciliation required"
    );
    false
}
