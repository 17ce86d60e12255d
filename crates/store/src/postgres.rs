use std::time::Duration;

use async_trait::async_trait;
use common::{NotificationId, OrderId, ProductId, UserId};
use domain::{
    Money, NewNotification, NewOrder, NewProduct, NewUser, Notification, NotificationKind, Order,
    OrderLine, OrderStatus, OrderUpdate, Product, Role, User,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::store::{
    Decrement, NotificationStore, OrderStore, ProductStore, UserStore, quantity_as_i32,
};
use crate::{Result, StoreError};

const ORDER_COLUMNS: &str = "id, user_id, total_amount, items, shipping_address, payment_method, \
     transaction_id, status, tracking_id, created_at";
const PRODUCT_COLUMNS: &str = "id, name, price, stock_quantity, is_available, created_at";
const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, description, type, metadata, is_read, created_at";
const USER_COLUMNS: &str = "id, name, email, phone, role, created_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the schema if it is missing.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database schema up to date");
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let id: i64 = row.try_get("id")?;
        let status: String = row.try_get("status")?;
        let status = status.parse::<OrderStatus>().map_err(|e| StoreError::CorruptRow {
            table: "orders",
            id,
            reason: e.to_string(),
        })?;
        let Json(items): Json<Vec<OrderLine>> = row.try_get("items")?;

        Ok(Order {
            id: OrderId::new(id),
            user_id: UserId::new(row.try_get("user_id")?),
            total_amount: Money::new(row.try_get::<Decimal, _>("total_amount")?),
            items,
            shipping_address: row.try_get("shipping_address")?,
            payment_method: row.try_get("payment_method")?,
            transaction_id: row.try_get("transaction_id")?,
            status,
            tracking_id: row.try_get("tracking_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::new(row.try_get::<Decimal, _>("price")?),
            stock_quantity: row.try_get("stock_quantity")?,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_notification(row: PgRow) -> Result<Notification> {
        Ok(Notification {
            id: NotificationId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            kind: NotificationKind::new(row.try_get::<String, _>("type")?),
            metadata: row.try_get("metadata")?,
            is_read: row.try_get("is_read")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        let id: i64 = row.try_get("id")?;
        let role: String = row.try_get("role")?;
        let role = role.parse::<Role>().map_err(|e| StoreError::CorruptRow {
            table: "users",
            id,
            reason: e.to_string(),
        })?;

        Ok(User {
            id: UserId::new(id),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (user_id, total_amount, items, shipping_address, payment_method, transaction_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.user_id.get())
        .bind(order.total_amount.amount())
        .bind(Json(&order.items))
        .bind(&order.shipping_address)
        .bind(&order.payment_method)
        .bind(&order.transaction_id)
        .bind(OrderStatus::Confirmed.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_order(row)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders SET
                status = $1,
                tracking_id = COALESCE($2, tracking_id)
            WHERE id = $3 AND status = $4
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(update.status.as_str())
        .bind(&update.tracking_id)
        .bind(id.get())
        .bind(update.expected_status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (name, price, stock_quantity, is_available)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.stock_quantity)
        .bind(product.is_available)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn set_stock(&self, id: ProductId, quantity: i32) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "UPDATE products SET stock_quantity = $1 WHERE id = $2 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(quantity)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn decrement_stock_floored(&self, id: ProductId, quantity: u32) -> Result<Decrement> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products SET stock_quantity = GREATEST(0, stock_quantity - $1)
            WHERE id = $2
            RETURNING stock_quantity
            "#,
        )
        .bind(quantity_as_i32(quantity))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(match remaining {
            Some(remaining) => Decrement::Applied { remaining },
            None => Decrement::ProductNotFound,
        })
    }

    async fn decrement_stock_conditional(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<Decrement> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products SET stock_quantity = stock_quantity - $1
            WHERE id = $2 AND stock_quantity >= $1
            RETURNING stock_quantity
            "#,
        )
        .bind(quantity_as_i32(quantity))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(Decrement::Applied { remaining });
        }

        // Nothing matched: tell a missing product apart from a short one
        let available: Option<i32> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;

        Ok(match available {
            Some(available) => Decrement::InsufficientStock { available },
            None => Decrement::ProductNotFound,
        })
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO notifications (user_id, title, description, type, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(notification.user_id.get())
        .bind(&notification.title)
        .bind(&notification.description)
        .bind(notification.kind.as_str())
        .bind(&notification.metadata)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_notification(row)
    }

    async fn insert_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<Vec<Notification>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(notifications.len());

        for notification in &notifications {
            let row = sqlx::query(&format!(
                r#"
                INSERT INTO notifications (user_id, title, description, type, metadata)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {NOTIFICATION_COLUMNS}
                "#
            ))
            .bind(notification.user_id.get())
            .bind(&notification.title)
            .bind(&notification.description)
            .bind(notification.kind.as_str())
            .bind(&notification.metadata)
            .fetch_one(&mut *tx)
            .await?;

            stored.push(Self::row_to_notification(row)?);
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn list_notifications_for_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id.get())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE (email IS NOT NULL AND email = $1) OR (phone IS NOT NULL AND phone = $2)
            )
            "#,
        )
        .bind(&user.email)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(StoreError::AlreadyExists("User"));
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, phone, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(Role::User.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::AlreadyExists("User")
            }
            other => StoreError::Database(other),
        })?;

        Self::row_to_user(row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users SET role = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(role.as_str())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn list_admin_ids(&self) -> Result<Vec<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM users WHERE role = $1 ORDER BY id")
            .bind(Role::Admin.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }
}
