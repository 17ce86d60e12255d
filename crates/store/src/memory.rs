use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{NotificationId, OrderId, ProductId, UserId};
use domain::{
    NewNotification, NewOrder, NewProduct, NewUser, Notification, Order, OrderStatus, OrderUpdate,
    Product, Role, User,
};
use tokio::sync::RwLock;

use crate::store::{
    Decrement, NotificationStore, OrderStore, ProductStore, UserStore, quantity_as_i32,
};
use crate::{Result, StoreError};

/// An operation the in-memory store can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// `insert_order` fails.
    OrderInsert,
    /// Both stock decrement operations fail.
    StockUpdate,
    /// Notification inserts (single and batch) fail.
    NotificationInsert,
    /// `list_admin_ids` fails.
    AdminLookup,
}

#[derive(Debug, Default)]
struct Faults {
    order_insert: AtomicBool,
    stock_update: AtomicBool,
    notification_insert: AtomicBool,
    admin_lookup: AtomicBool,
}

impl Faults {
    fn flag(&self, fault: Fault) -> &AtomicBool {
        match fault {
            Fault::OrderInsert => &self.order_insert,
            Fault::StockUpdate => &self.stock_update,
            Fault::NotificationInsert => &self.notification_insert,
            Fault::AdminLookup => &self.admin_lookup,
        }
    }

    fn check(&self, fault: Fault) -> Result<()> {
        if self.flag(fault).load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{fault:?} failed")))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    orders: BTreeMap<OrderId, Order>,
    products: BTreeMap<ProductId, Product>,
    notifications: BTreeMap<NotificationId, Notification>,
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

impl Tables {
    // One sequence shared by all tables keeps ids unique and increasing.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn store_notification(&mut self, new: NewNotification) -> Notification {
        let notification = Notification {
            id: NotificationId::new(self.next_id()),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            kind: new.kind,
            metadata: new.metadata,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications
            .insert(notification.id, notification.clone());
        notification
    }
}

/// In-memory store for tests and for running without a database.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure injection so callers can exercise their error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes an operation fail (or succeed again) until changed.
    pub fn set_fault(&self, fault: Fault, enabled: bool) {
        self.faults.flag(fault).store(enabled, Ordering::SeqCst);
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns every stored notification, oldest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.tables
            .read()
            .await
            .notifications
            .values()
            .cloned()
            .collect()
    }
}

// Mirrors the `stock_quantity >= 0` CHECK constraint.
fn non_negative_stock(quantity: i32) -> Result<i32> {
    if quantity < 0 {
        return Err(StoreError::Constraint("stock_quantity must not be negative"));
    }
    Ok(quantity)
}

// Ids grow with insertion order, so newest first is descending id order.
fn newest_first<T>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    rows.rev().collect()
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        self.faults.check(Fault::OrderInsert)?;

        let mut tables = self.tables.write().await;
        let order = Order {
            id: OrderId::new(tables.next_id()),
            user_id: order.user_id,
            total_amount: order.total_amount,
            items: order.items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            transaction_id: order.transaction_id,
            status: OrderStatus::Confirmed,
            tracking_id: None,
            created_at: Utc::now(),
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.orders.values().cloned()))
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .orders
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned(),
        ))
    }

    async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        let Some(order) = tables.orders.get_mut(&id) else {
            return Ok(None);
        };
        if order.status != update.expected_status {
            return Ok(None);
        }

        order.status = update.status;
        if let Some(tracking_id) = update.tracking_id {
            order.tracking_id = Some(tracking_id);
        }
        Ok(Some(order.clone()))
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let stock_quantity = non_negative_stock(product.stock_quantity)?;
        let mut tables = self.tables.write().await;
        let product = Product {
            id: ProductId::new(tables.next_id()),
            name: product.name,
            price: product.price,
            stock_quantity,
            is_available: product.is_available,
            created_at: Utc::now(),
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.products.values().cloned()))
    }

    async fn set_stock(&self, id: ProductId, quantity: i32) -> Result<Option<Product>> {
        let quantity = non_negative_stock(quantity)?;
        let mut tables = self.tables.write().await;
        Ok(tables.products.get_mut(&id).map(|product| {
            product.stock_quantity = quantity;
            product.clone()
        }))
    }

    async fn decrement_stock_floored(&self, id: ProductId, quantity: u32) -> Result<Decrement> {
        self.faults.check(Fault::StockUpdate)?;

        let mut tables = self.tables.write().await;
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(Decrement::ProductNotFound);
        };
        product.stock_quantity = product
            .stock_quantity
            .saturating_sub(quantity_as_i32(quantity))
            .max(0);
        Ok(Decrement::Applied {
            remaining: product.stock_quantity,
        })
    }

    async fn decrement_stock_conditional(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<Decrement> {
        self.faults.check(Fault::StockUpdate)?;

        let mut tables = self.tables.write().await;
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(Decrement::ProductNotFound);
        };
        let quantity = quantity_as_i32(quantity);
        if product.stock_quantity < quantity {
            return Ok(Decrement::InsufficientStock {
                available: product.stock_quantity,
            });
        }
        product.stock_quantity -= quantity;
        Ok(Decrement::Applied {
            remaining: product.stock_quantity,
        })
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.faults.check(Fault::NotificationInsert)?;
        Ok(self.tables.write().await.store_notification(notification))
    }

    async fn insert_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<Vec<Notification>> {
        self.faults.check(Fault::NotificationInsert)?;

        let mut tables = self.tables.write().await;
        Ok(notifications
            .into_iter()
            .map(|n| tables.store_notification(n))
            .collect())
    }

    async fn list_notifications_for_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .notifications
                .values()
                .filter(|n| n.user_id == user_id)
                .cloned(),
        ))
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for notification in tables
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        let taken = tables.users.values().any(|existing| {
            (user.email.is_some() && existing.email == user.email)
                || (user.phone.is_some() && existing.phone == user.phone)
        });
        if taken {
            return Err(StoreError::AlreadyExists("User"));
        }

        let user = User {
            id: UserId::new(tables.next_id()),
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: Role::User,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn list_admin_ids(&self) -> Result<Vec<UserId>> {
        self.faults.check(Fault::AdminLookup)?;

        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.role == Role::Admin)
            .map(|u| u.id)
            .collect())
    }
}
