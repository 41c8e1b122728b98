//! Request validation. All checks run before any store mutation and
//! return [`ServiceError::InvalidRequest`] naming the offending field.

use crate::error::ServiceError;
use crate::model::{ItemPatch, NewItem, OrderLineRequest};

pub fn validate_line_items(
    lines: &[OrderLineRequest],
    max_line_items: usize,
) -> Result<(), ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::invalid(
            "order must contain at least one line item",
        ));
    }
    if lines.len() > max_line_items {
        return Err(ServiceError::invalid(format!(
            "order has {} line items, maximum is {max_line_items}",
            lines.len()
        )));
    }
    for (index, line) in lines.iter().enumerate() {
        if line.product_id.trim().is_empty() {
            return Err(ServiceError::invalid(format!(
                "line {index}: product id must not be empty"
            )));
        }
        if line.qty == 0 {
            return Err(ServiceError::invalid(format!(
                "line {index}: qty must be a positive integer, got {}",
                line.qty
            )));
        }
    }
    Ok(())
}

pub fn validate_new_item(item: &NewItem) -> Result<(), ServiceError> {
    if item.name.trim().is_empty() {
        return Err(ServiceError::invalid("item name must not be empty"));
    }
    validate_price("costPrice", item.cost_price)?;
    validate_price("sellingPrice", item.selling_price)?;
    Ok(())
}

pub fn validate_item_patch(patch: &ItemPatch) -> Result<(), ServiceError> {
    if let Some(name) = &patch.name
        && name.trim().is_empty()
    {
        return Err(ServiceError::invalid("item name must not be empty"));
    }
    if let Some(cost) = patch.cost_price {
        validate_price("costPrice", cost)?;
    }
    if let Some(selling) = patch.selling_price {
        validate_price("sellingPrice", selling)?;
    }
    Ok(())
}

fn validate_price(field: &str, value: f64) -> Result<(), ServiceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::invalid(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Trim an optional text field, mapping blank input to absent.
pub fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
