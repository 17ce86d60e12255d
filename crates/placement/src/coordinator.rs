//! Order placement coordinator.

use std::time::Instant;

use common::{OrderId, UserId};
use domain::{NewUser, Order, PlaceOrder, StatusUpdate, User};
use store::Store;

use crate::error::{PlacementError, Result};
use crate::notify::{self, FanOutOutcome, NotificationFanOut};
use crate::stock::{StockAdjustment, StockPolicy, StockReport};

/// Everything that happened while placing one order.
///
/// Only `order` reaches the client; the step outcomes feed logs, metrics and tests.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order: Order,
    pub stock: StockReport,
    pub notifications: FanOutOutcome,
}

/// Places orders and applies their side effects.
///
/// Stateless apart from the store handle: each call runs its steps as
/// independent statements, with no transaction spanning the order insert,
/// the stock updates and the notifications.
#[derive(Clone)]
pub struct PlacementCoordinator<S: Store> {
    store: S,
    stock: StockAdjustment<S>,
    fan_out: NotificationFanOut<S>,
}

impl<S: Store> PlacementCoordinator<S> {
    /// Creates a coordinator using the given stock policy.
    pub fn new(store: S, policy: StockPolicy) -> Self {
        Self {
            stock: StockAdjustment::new(store.clone(), policy),
            fan_out: NotificationFanOut::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fan_out(&self) -> &NotificationFanOut<S> {
        &self.fan_out
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.stock.policy()
    }

    /// Places an order.
    ///
    /// Only validation and the order insert can fail. Once the order row
    /// exists the placement succeeds: stock and notification failures are
    /// logged, counted and reported in the returned [`Placement`].
    #[tracing::instrument(skip(self, cmd), fields(user_id = tracing::field::Empty))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<Placement> {
        let started = Instant::now();
        let new_order = cmd.validate()?;
        tracing::Span::current().record("user_id", new_order.user_id.get());

        // 1. Insert the order row. Failing here leaves nothing behind.
        let order = self.store.insert_order(new_order).await.inspect_err(|e| {
            metrics::counter!("order_placement_failures_total").increment(1);
            tracing::error!(error = %e, "failed to insert order");
        })?;
        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");

        // 2. Stock adjustment (best-effort)
        let stock = self.stock.adjust(&order).await;
        let drifted = stock.failures().count();
        if drifted > 0 {
            metrics::counter!("order_side_effect_failures_total", "step" => "stock")
                .increment(drifted as u64);
            tracing::warn!(
                order_id = %order.id,
                lines = drifted,
                "order placed without matching stock update"
            );
        }

        // 3. Notification fan-out (best-effort, all-or-nothing)
        let notifications = match self.fan_out.fan_out(&order).await {
            Ok(stored) => notify::delivered(&stored),
            Err(e) => {
                metrics::counter!("order_side_effect_failures_total", "step" => "notifications")
                    .increment(1);
                tracing::warn!(
                    order_id = %order.id,
                    error = %e,
                    "failed to create notifications for order"
                );
                FanOutOutcome::Failed(e.to_string())
            }
        };

        metrics::histogram!("order_placement_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(Placement {
            order,
            stock,
            notifications,
        })
    }

    /// Changes an order's status and/or tracking reference.
    ///
    /// The move is checked against the status lifecycle and written only if
    /// the order still has the status it was checked against.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_order(&self, id: OrderId, update: StatusUpdate) -> Result<Order> {
        let current = self
            .store
            .get_order(id)
            .await?
            .ok_or_else(|| PlacementError::order_not_found(id))?;

        let checked = update.against(&current)?;
        let from = current.status;
        let to = checked.status;

        match self.store.update_order(id, checked).await? {
            Some(order) => {
                if from != to {
                    tracing::info!(order_id = %id, %from, %to, "order status changed");
                }
                Ok(order)
            }
            None => match self.store.get_order(id).await? {
                Some(_) => Err(PlacementError::StatusChanged(id)),
                None => Err(PlacementError::order_not_found(id)),
            },
        }
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| PlacementError::order_not_found(id))
    }

    /// Lists every order, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.list_orders().await?)
    }

    /// Lists a user's orders, newest first.
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.store.list_orders_for_user(user_id).await?)
    }

    /// Registers a user and sends the welcome notification.
    ///
    /// A failed welcome notification is logged; the user is still returned.
    #[tracing::instrument(skip(self, user))]
    pub async fn register_user(&self, user: NewUser) -> Result<User> {
        let user = self.store.insert_user(user.validate()?).await?;
        tracing::info!(user_id = %user.id, "user registered");

        if let Err(e) = self.fan_out.notify_welcome(&user).await {
            metrics::counter!("order_side_effect_failures_total", "step" => "welcome").increment(1);
            tracing::warn!(user_id = %user.id, error = %e, "failed to create welcome notification");
        }
        Ok(user)
    }
}
