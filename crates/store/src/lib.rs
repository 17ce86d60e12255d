//! Persistence gateway.
//!
//! Every operation is one independent round trip against the relational
//! store: no retries, no caching and no transaction spanning calls. The
//! single exception is [`NotificationStore::insert_notifications`], which
//! writes its batch atomically.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{Fault, InMemoryStore};
pub use postgres::PostgresStore;
pub use store::{Decrement, NotificationStore, OrderStore, ProductStore, Store, UserStore};
