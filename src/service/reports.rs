//! Read-only reporting over the caller's orders and items.
//!
//! Cost figures use each referenced item's *current* cost price while
//! revenue is the stored point-of-sale total, so profit mixes a
//! historical and a live quantity. The asymmetry is intentional:
//! changing it would silently alter reported financials (see DESIGN.md).
//! A line whose product was deleted contributes zero cost and is absent
//! from per-product rows — reports never fail on a dangling reference.

use crate::error::ServiceError;
use crate::model::{DailyPoint, DateRange, InventoryItem, ItemId, PnlRow, PrincipalId, ReportSummary};
use crate::store::{InventoryStore, OrderStore};
use crate::utils::round_currency;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub struct ReportService {
    inventory: Arc<dyn InventoryStore>,
    orders: Arc<dyn OrderStore>,
}

#[derive(Default, Clone, Copy)]
struct SalesAccum {
    units: u32,
    revenue: f64,
    cost: f64,
}

impl ReportService {
    pub fn new(inventory: Arc<dyn InventoryStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { inventory, orders }
    }

    /// Headline figures for the window: revenue, profit, current
    /// inventory value and order count.
    pub async fn summary(
        &self,
        principal: &PrincipalId,
        range: DateRange,
    ) -> Result<ReportSummary, ServiceError> {
        let orders = self.orders.list_by_owner(principal, range).await?;
        let items = self.inventory.list_by_owner(principal).await?;
        let costs: HashMap<&ItemId, f64> =
            items.iter().map(|item| (&item.id, item.cost_price)).collect();

        let mut total_revenue = 0.0;
        let mut total_cost = 0.0;
        for order in &orders {
            total_revenue += order.total_amount;
            for line in &order.lines {
                if let Some(cost_price) = costs.get(&line.product_id) {
                    total_cost += cost_price * f64::from(line.qty);
                }
            }
        }

        let inventory_value: f64 = items
            .iter()
            .map(|item| item.cost_price * f64::from(item.quantity))
            .sum();

        Ok(ReportSummary {
            total_revenue: round_currency(total_revenue),
            total_profit: round_currency(total_revenue - total_cost),
            inventory_value: round_currency(inventory_value),
            order_count: orders.len(),
        })
    }

    /// Revenue and profit grouped by UTC calendar day, ascending.
    pub async fn daily_breakdown(
        &self,
        principal: &PrincipalId,
        range: DateRange,
    ) -> Result<Vec<DailyPoint>, ServiceError> {
        let orders = self.orders.list_by_owner(principal, range).await?;
        let items = self.inventory.list_by_owner(principal).await?;
        let costs: HashMap<&ItemId, f64> =
            items.iter().map(|item| (&item.id, item.cost_price)).collect();

        let mut days: BTreeMap<chrono::NaiveDate, (f64, f64)> = BTreeMap::new();
        for order in &orders {
            let mut order_cost = 0.0;
            for line in &order.lines {
                if let Some(cost_price) = costs.get(&line.product_id) {
                    order_cost += cost_price * f64::from(line.qty);
                }
            }
            let entry = days.entry(order.created_at.date_naive()).or_default();
            entry.0 += order.total_amount;
            entry.1 += order.total_amount - order_cost;
        }

        Ok(days
            .into_iter()
            .map(|(date, (revenue, profit))| DailyPoint {
                date,
                revenue: round_currency(revenue),
                profit: round_currency(profit),
            })
            .collect())
    }

    /// Per-product profit and loss over the window, computed from current
    /// prices, including products with zero sales, sorted by revenue
    /// descending.
    pub async fn product_pnl(
        &self,
        principal: &PrincipalId,
        range: DateRange,
    ) -> Result<Vec<PnlRow>, ServiceError> {
        let orders = self.orders.list_by_owner(principal, range).await?;
        let items = self.inventory.list_by_owner(principal).await?;
        let by_id: HashMap<&ItemId, &InventoryItem> =
            items.iter().map(|item| (&item.id, item)).collect();

        let mut stats: HashMap<ItemId, SalesAccum> = HashMap::new();
        for order in &orders {
            for line in &order.lines {
                // A deleted product has no current prices to attribute.
                let Some(item) = by_id.get(&line.product_id) else {
                    continue;
                };
                let entry = stats.entry(line.product_id.clone()).or_default();
                entry.units += line.qty;
                entry.revenue += item.selling_price * f64::from(line.qty);
                entry.cost += item.cost_price * f64::from(line.qty);
            }
        }

        let mut rows: Vec<PnlRow> = items
            .iter()
            .map(|item| {
                let sales = stats.get(&item.id).copied().unwrap_or_default();
                let profit = sales.revenue - sales.cost;
                let margin = if sales.revenue > 0.0 {
                    profit / sales.revenue * 100.0
                } else {
                    0.0
                };
                PnlRow {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    sku: item.sku.clone(),
                    category: item.category.clone(),
                    quantity: item.quantity,
                    cost_price: item.cost_price,
                    selling_price: item.selling_price,
                    units_sold: sales.units,
                    revenue: round_currency(sales.revenue),
                    cost: round_currency(sales.cost),
                    profit: round_currency(profit),
                    margin: round_currency(margin),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(rows)
    }
}
