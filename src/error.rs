//! Error taxonomy for the order placement and inventory services.
//!
//! Validation and lookup failures are detected before any mutation;
//! `InsufficientStock` can additionally surface after a lost reservation
//! race, in which case every decrement that did apply has already been
//! rolled back. `RollbackFailure` is the one state that leaves stock
//! inconsistent and is logged as critical for manual reconciliation.

use crate::model::ItemId;
use strum::IntoStaticStr;
use thiserror::Error;

/// Failures at the persistence boundary. The in-memory stores only
/// produce `DuplicateId`; real document-store backends map their
/// transport and server errors onto `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate record id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, PartialEq, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ServiceError {
    /// Malformed or empty input; nothing was mutated.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The referenced product does not exist; nothing was mutated.
    #[error("product not found: {product_id}")]
    NotFound { product_id: String },

    /// The product exists but belongs to a different principal.
    #[error("not authorised to access product \"{name}\"")]
    Forbidden { name: String },

    /// Requested quantity exceeds on-hand stock, either at the pre-check
    /// or because a concurrent order consumed it first.
    #[error("insufficient stock for \"{name}\": available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u32,
    },

    /// A compensating increment failed after a decrement had applied;
    /// stock is under-counted until reconciled by hand.
    #[error("rollback failed: stock for {product_id} under-counted by {amount}")]
    RollbackFailure { product_id: ItemId, amount: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Stable snake_case name of the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// HTTP status the surrounding (out-of-scope) web layer maps this to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } | Self::InsufficientStock { .. } => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::RollbackFailure { .. } | Self::Store(_) => 500,
        }
    }

    /// Coarse classification for metrics and log filtering.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "client_error",
            Self::NotFound { .. } => "resource_not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InsufficientStock { .. } => "stock_conflict",
            Self::RollbackFailure { .. } => "critical",
            Self::Store(_) => "store_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_web_layer_contract() {
        assert_eq!(ServiceError::invalid("x").status_code(), 400);
        assert_eq!(
            ServiceError::NotFound {
                product_id: "itm-1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            ServiceError::Forbidden {
                name: "Widget".into()
            }
            .status_code(),
            403
        );
        assert_eq!(
            ServiceError::InsufficientStock {
                name: "Widget".into(),
                available: 0,
                requested: 1
            }
            .status_code(),
            400
        );
        assert_eq!(
            ServiceError::RollbackFailure {
                product_id: ItemId("itm-1".into()),
                amount: 2
            }
            .status_code(),
            500
        );
        assert_eq!(
            ServiceError::Store(StoreError::Unavailable("down".into())).status_code(),
            500
        );
    }

    #[test]
    fn kind_names_are_snake_case_variant_names() {
        assert_eq!(ServiceError::invalid("x").kind(), "invalid_request");
        assert_eq!(
            ServiceError::InsufficientStock {
                name: "Widget".into(),
                available: 1,
                requested: 2
            }
            .kind(),
            "insufficient_stock"
        );
        assert_eq!(
            ServiceError::Store(StoreError::Unavailable("down".into())).kind(),
            "store"
        );
    }

    #[test]
    fn messages_name_the_product_and_quantities() {
        let err = ServiceError::InsufficientStock {
            name: "Blue Widget".into(),
            available: 3,
            requested: 10,
        };
        let message = err.to_string();
        assert!(message.contains("Blue Widget"));
        assert!(message.contains("available 3"));
        assert!(message.contains("requested 10"));
    }
}
