//! Placement error types.

use common::OrderId;
use domain::ValidationError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the order operations.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// The request was rejected before anything was written.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The store failed on a step whose failure is fatal.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The order's status changed between reading and writing it.
    #[error("Order {0} was updated concurrently, retry with its current status")]
    StatusChanged(OrderId),
}

impl PlacementError {
    pub fn order_not_found(id: OrderId) -> Self {
        PlacementError::NotFound {
            entity: "Order",
            id: id.get(),
        }
    }
}

/// Convenience type alias for placement results.
pub type Result<T> = std::result::Result<T, PlacementError>;
