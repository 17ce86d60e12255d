//! Notifications shown in a user's inbox.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{NotificationId, Order, User, UserId};

/// Type tag of a notification, e.g. `order` or `welcome`.
///
/// The known tags are constants; direct inserts may use any other tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationKind(Cow<'static, str>);

impl NotificationKind {
    /// Sent to a purchaser when their order is placed.
    pub const ORDER: NotificationKind = NotificationKind(Cow::Borrowed("order"));
    /// Sent to every admin when any order is placed.
    pub const ADMIN_ORDER: NotificationKind = NotificationKind(Cow::Borrowed("admin_order"));
    /// Sent once when a user registers.
    pub const WELCOME: NotificationKind = NotificationKind(Cow::Borrowed("welcome"));

    /// Creates a tag from any string.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted notification row. Only `is_read` changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub metadata: Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification to insert. Notifications start unread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub metadata: Value,
}

impl NewNotification {
    pub fn new(
        user_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: NotificationKind,
        metadata: Value,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: description.into(),
            kind,
            metadata,
        }
    }

    /// Tells the purchaser their order went through.
    pub fn order_placed(order: &Order) -> Self {
        Self::new(
            order.user_id,
            "Order Placed Successfully",
            format!(
                "Your order #{} for {} has been placed. We will update you once it ships.",
                order.id, order.total_amount
            ),
            NotificationKind::ORDER,
            order_metadata(order),
        )
    }

    /// Tells an admin a new order needs handling.
    pub fn order_received(admin: UserId, order: &Order) -> Self {
        Self::new(
            admin,
            "New Order Received",
            format!(
                "New Order #{} received for {}. Check Admin Panel.",
                order.id, order.total_amount
            ),
            NotificationKind::ADMIN_ORDER,
            order_metadata(order),
        )
    }

    /// Greets a newly registered user.
    pub fn welcome(user: &User) -> Self {
        Self::new(
            user.id,
            "Welcome to RKJ Fashions!",
            "Your account has been successfully created. Happy Shopping!",
            NotificationKind::WELCOME,
            json!({}),
        )
    }
}

fn order_metadata(order: &Order) -> Value {
    json!({ "orderId": order.id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Money, OrderId, OrderLine, OrderStatus, ProductId, Role};

    fn sample_order() -> Order {
        Order {
            id: OrderId::new(42),
            user_id: UserId::new(3),
            total_amount: Money::from_minor(149_900),
            items: vec![OrderLine::new(ProductId::new(5), 3)],
            shipping_address: Value::Null,
            payment_method: None,
            transaction_id: None,
            status: OrderStatus::Confirmed,
            tracking_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_placed_targets_purchaser() {
        let notification = NewNotification::order_placed(&sample_order());
        assert_eq!(notification.user_id, UserId::new(3));
        assert_eq!(notification.kind, NotificationKind::ORDER);
        assert_eq!(notification.metadata, json!({ "orderId": 42 }));
        assert_eq!(
            notification.description,
            "Your order #42 for ₹1499.00 has been placed. We will update you once it ships."
        );
    }

    #[test]
    fn test_order_received_targets_admin() {
        let notification = NewNotification::order_received(UserId::new(1), &sample_order());
        assert_eq!(notification.user_id, UserId::new(1));
        assert_eq!(notification.kind.as_str(), "admin_order");
        assert_eq!(notification.metadata["orderId"], 42);
    }

    #[test]
    fn test_welcome() {
        let user = User {
            id: UserId::new(9),
            name: None,
            email: Some("asha@example.com".to_string()),
            phone: None,
            role: Role::User,
            created_at: Utc::now(),
        };
        let notification = NewNotification::welcome(&user);
        assert_eq!(notification.kind, NotificationKind::WELCOME);
        assert_eq!(notification.metadata, json!({}));
    }

    #[test]
    fn test_kind_serializes_under_type_key() {
        let notification = NewNotification::new(
            UserId::new(1),
            "Sale",
            "Diwali sale starts now",
            NotificationKind::new("promo"),
            Value::Null,
        );
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "promo");
    }
}
