//! Shared identifier types.

pub mod ids;

pub use ids::{NotificationId, OrderId, ProductId, UserId};
