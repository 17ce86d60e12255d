use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{
    NewNotification, NewOrder, NewProduct, NewUser, Notification, Order, OrderUpdate, Product,
    Role, User,
};

use crate::Result;

/// Outcome of a stock decrement for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Stock was lowered; `remaining` is the new quantity.
    Applied { remaining: i32 },
    /// The conditional decrement found fewer units than requested. Stock is unchanged.
    InsufficientStock { available: i32 },
    /// No product has this id.
    ProductNotFound,
}

/// Order rows.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order with status `Confirmed` and returns the stored row.
    async fn insert_order(&self, order: NewOrder) -> Result<Order>;

    /// Loads one order.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Lists a user's orders, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Applies a status/tracking update.
    ///
    /// Returns None if the order does not exist or is no longer in
    /// `update.expected_status`. A `None` tracking id keeps the stored one.
    async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>>;
}

/// Product rows and their stock.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: NewProduct) -> Result<Product>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists every product, newest first.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Overwrites the stock quantity. Returns None for an unknown product.
    async fn set_stock(&self, id: ProductId, quantity: i32) -> Result<Option<Product>>;

    /// Lowers stock by `quantity`, clamping at zero. Never checks availability.
    async fn decrement_stock_floored(&self, id: ProductId, quantity: u32) -> Result<Decrement>;

    /// Lowers stock by `quantity` only if at least that many units are on hand.
    ///
    /// The check and the write are a single statement, so concurrent callers
    /// cannot both take the last units.
    async fn decrement_stock_conditional(&self, id: ProductId, quantity: u32)
    -> Result<Decrement>;
}

/// Notification rows.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification>;

    /// Inserts a batch atomically: either every notification is stored or none is.
    async fn insert_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<Vec<Notification>>;

    /// Lists a user's notifications, newest first.
    async fn list_notifications_for_user(&self, user_id: UserId) -> Result<Vec<Notification>>;

    /// Marks every notification of a user as read. Returns how many rows changed.
    async fn mark_all_read(&self, user_id: UserId) -> Result<u64>;
}

/// User rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user with [`Role::User`].
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Changes a user's role. Returns None for an unknown user.
    async fn set_role(&self, id: UserId, role: Role) -> Result<Option<User>>;

    /// Ids of every user currently holding [`Role::Admin`], read fresh on each call.
    async fn list_admin_ids(&self) -> Result<Vec<UserId>>;
}

/// Everything the application needs from a store.
pub trait Store: OrderStore + ProductStore + NotificationStore + UserStore + Clone + 'static {}

// Blanket implementation for anything implementing every table trait
impl<T> Store for T where T: OrderStore + ProductStore + NotificationStore + UserStore + Clone + 'static
{}

/// Clamps a requested quantity into the database's `INTEGER` range.
pub(crate) fn quantity_as_i32(quantity: u32) -> i32 {
    i32::try_from(quantity).unwrap_or(i32::MAX)
}
