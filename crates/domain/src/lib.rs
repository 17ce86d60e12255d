//! Domain layer for the storefront backend.
//!
//! This crate holds the plain data model shared by the store, the order
//! placement orchestrator and the HTTP API:
//! - Orders, their line items and the status lifecycle
//! - Products and stock
//! - Notifications and the messages the system sends
//! - Users and roles

pub mod error;
pub mod money;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use common::{NotificationId, OrderId, ProductId, UserId};
pub use error::ValidationError;
pub use money::Money;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use order::{NewOrder, Order, OrderLine, OrderStatus, OrderUpdate, PlaceOrder, StatusUpdate};
pub use product::{NewProduct, Product};
pub use user::{NewUser, Role, User};
