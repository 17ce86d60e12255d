//! Order placement and its side-effect fan-out.
//!
//! Placing an order runs three steps against the store:
//! 1. Insert the order row (fatal on failure)
//! 2. Decrement stock for every line (best-effort)
//! 3. Notify the purchaser and every admin (best-effort, one atomic batch)
//!
//! Steps 2 and 3 never fail the placement. Their failures are logged as
//! structured events and counted, so operators can reconcile stock and
//! notifications against the order ledger.

pub mod coordinator;
pub mod error;
pub mod notify;
pub mod stock;

pub use coordinator::{Placement, PlacementCoordinator};
pub use error::PlacementError;
pub use notify::{FanOutOutcome, NotificationFanOut};
pub use stock::{
    LineAdjustment, StockAdjustment, StockOutcome, StockPolicy, StockReport, UnknownStockPolicy,
};
