//! Orders, their line items and status lifecycle.

mod line;
mod model;
mod status;

pub use line::OrderLine;
pub use model::{NewOrder, Order, OrderUpdate, PlaceOrder, StatusUpdate};
pub use status::OrderStatus;
