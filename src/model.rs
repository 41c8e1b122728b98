use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of the authenticated actor. Supplied by the (excluded)
/// authentication middleware and trusted as-is; used purely as the
/// ownership key for items and orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn generate() -> Self {
        Self(format!("itm-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate() -> Self {
        Self(format!("ord-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stocked product owned by one principal. Quantity is mutated only by
/// explicit edits or by order-placement decrements; it is never observed
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub owner_id: PrincipalId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
    pub cost_price: f64,
    pub selling_price: f64,
    /// Reference only; upload and hosting happen elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One `(product, quantity)` pair inside a committed order. The product
/// reference is weak: the item may be deleted later, and reporting treats
/// the dangling reference as a deleted product rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "productId")]
    pub product_id: ItemId,
    pub qty: u32,
}

/// A committed order. Created whole or not at all, immutable afterwards,
/// never deleted. `total_amount` is the server-computed snapshot of
/// `Σ qty × selling price` at creation time and is never revised when
/// prices change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub owner_id: PrincipalId,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

/// One requested line of an order before validation. Carries the raw
/// product id exactly as the caller sent it; any client-supplied total is
/// dropped at the parsing layer above and never reaches the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderLineRequest {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub qty: u32,
}

impl OrderLineRequest {
    pub fn new(product_id: impl Into<String>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// Payload for creating an inventory item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    pub cost_price: f64,
    pub selling_price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial update for an inventory item; only supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub cost_price: Option<f64>,
    #[serde(default)]
    pub selling_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Optional inclusive window on order creation time. Both bounds absent
/// means all-time.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start
            && at < start
        {
            return false;
        }
        if let Some(end) = self.end
            && at > end
        {
            return false;
        }
        true
    }
}

/// Headline figures for the caller's window. Revenue is the stored
/// point-of-sale total; cost uses each item's current cost price, so the
/// profit figure mixes a historical and a live quantity by design.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_revenue: f64,
    pub total_profit: f64,
    pub inventory_value: f64,
    pub order_count: usize,
}

/// Revenue and profit for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
}

/// Per-product profit-and-loss row. Products with no sales in the window
/// are included with zeroed sales figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlRow {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
    pub cost_price: f64,
    pub selling_price: f64,
    pub units_sold: u32,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    /// Percentage, 0 when the product had no revenue in the window.
    pub margin: f64,
}

/// An order enriched for history views: line names resolved against
/// current inventory, `None` marking a deleted product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub items: Vec<OrderLineView>,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub product_id: ItemId,
    pub qty: u32,
    pub product_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn order_wire_shape_is_stable() {
        let order = Order {
            id: OrderId("ord-1".into()),
            owner_id: PrincipalId("usr-1".into()),
            lines: vec![OrderLine {
                product_id: ItemId("itm-1".into()),
                qty: 2,
            }],
            total_amount: 19.98,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(&order).expect("serialize");
        let object = value.as_object().expect("object");
        assert!(object.contains_key("id"));
        assert!(object.contains_key("ownerId"));
        assert!(object.contains_key("items"));
        assert!(object.contains_key("totalAmount"));
        assert!(object.contains_key("createdAt"));

        let line = &value["items"][0];
        assert_eq!(line["productId"], "itm-1");
        assert_eq!(line["qty"], 2);

        let back: Order = serde_json::from_value(value).expect("round-trip");
        assert_eq!(back, order);
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = ItemId::generate();
        let b = ItemId::generate();
        assert!(a.as_str().starts_with("itm-"));
        assert_ne!(a, b);
        assert!(OrderId::generate().as_str().starts_with("ord-"));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let range = DateRange::between(Some(start), Some(end));

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(start - chrono::Duration::seconds(1)));
        assert!(!range.contains(end + chrono::Duration::seconds(1)));
        assert!(DateRange::all().contains(start));
    }
}
