//! Notification fan-out step.

use domain::{NewNotification, Notification, NotificationKind, Order, User};
use store::{NotificationStore, UserStore};

/// Result of the notification step of a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanOutOutcome {
    /// Every notification was stored.
    Delivered { purchaser: usize, admins: usize },
    /// Nothing was stored.
    Failed(String),
}

/// Creates the notifications that follow an order or a registration.
#[derive(Clone)]
pub struct NotificationFanOut<S> {
    store: S,
}

impl<S> NotificationFanOut<S>
where
    S: NotificationStore + UserStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stores the purchaser's "order placed" notification.
    pub async fn notify_purchase(&self, order: &Order) -> store::Result<Notification> {
        self.store
            .insert_notification(NewNotification::order_placed(order))
            .await
    }

    /// Stores one "new order" notification per admin.
    ///
    /// Admins are looked up when called, so a user promoted a moment ago is
    /// included and a demoted one is not.
    pub async fn notify_admins(&self, order: &Order) -> store::Result<Vec<Notification>> {
        let batch = self.admin_notifications(order).await?;
        self.store.insert_notifications(batch).await
    }

    /// Stores the purchaser and admin notifications for an order as one batch.
    ///
    /// Either all of them are stored or none are.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn fan_out(&self, order: &Order) -> store::Result<Vec<Notification>> {
        let mut batch = vec![NewNotification::order_placed(order)];
        batch.extend(self.admin_notifications(order).await?);

        let stored = self.store.insert_notifications(batch).await?;
        tracing::debug!(count = stored.len(), "order notifications stored");
        Ok(stored)
    }

    /// Stores the welcome notification for a new user.
    pub async fn notify_welcome(&self, user: &User) -> store::Result<Notification> {
        self.store
            .insert_notification(NewNotification::welcome(user))
            .await
    }

    async fn admin_notifications(&self, order: &Order) -> store::Result<Vec<NewNotification>> {
        let admins = self.store.list_admin_ids().await?;
        Ok(admins
            .into_iter()
            .map(|admin| NewNotification::order_received(admin, order))
            .collect())
    }
}

/// Counts purchaser and admin notifications in a stored batch.
pub(crate) fn delivered(stored: &[Notification]) -> FanOutOutcome {
    let admins = stored
        .iter()
        .filter(|n| n.kind == NotificationKind::ADMIN_ORDER)
        .count();
    FanOutOutcome::Delivered {
        purchaser: stored.len() - admins,
        admins,
    }
}
