//! Domain validation errors.

use thiserror::Error;

use crate::order::OrderStatus;

/// Input rejected before anything is written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The order has no owning user.
    #[error("User ID is required")]
    UserIdRequired,

    /// The order has no line items.
    #[error("Order has no items")]
    NoItems,

    /// A currency amount is below zero.
    #[error("Invalid {field}: {amount} (must not be negative)")]
    NegativeAmount { field: &'static str, amount: String },

    /// A stock quantity is below zero.
    #[error("Invalid stock quantity: {0} (must not be negative)")]
    NegativeStock(i32),

    /// A required text field is missing or blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// Neither an email nor a phone number was supplied.
    #[error("Phone or Email is required")]
    ContactRequired,

    /// The status string does not name a known order status.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// The role string does not name a known role.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// The order lifecycle does not allow this move.
    #[error("Invalid status transition: cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}
