//! Integration tests for the order model.
//!
//! These tests drive a checkout payload through validation, the status
//! lifecycle and the notifications an order produces.

use chrono::Utc;
use domain::{
    Money, NewNotification, NotificationKind, Order, OrderId, OrderLine, OrderStatus, PlaceOrder,
    StatusUpdate, UserId, ValidationError,
};
use serde_json::json;

fn checkout_lines() -> Vec<OrderLine> {
    serde_json::from_value(json!([
        { "id": 5, "quantity": 3, "size": "M", "color": "indigo", "price": 499 },
        { "id": 8, "name": "Dupatta" },
        { "id": 9, "quantity": 0 }
    ]))
    .unwrap()
}

fn placed(status: OrderStatus) -> Order {
    let new_order = PlaceOrder::new(UserId::new(3), Money::from_minor(169_700), checkout_lines())
        .shipping_address(json!({ "line1": "12 MG Road", "city": "Jaipur" }))
        .paid_with("razorpay", "pay_Nx81")
        .validate()
        .unwrap();

    Order {
        id: OrderId::new(42),
        user_id: new_order.user_id,
        total_amount: new_order.total_amount,
        items: new_order.items,
        shipping_address: new_order.shipping_address,
        payment_method: new_order.payment_method,
        transaction_id: new_order.transaction_id,
        status,
        tracking_id: None,
        created_at: Utc::now(),
    }
}

mod checkout {
    use super::*;

    #[test]
    fn lines_keep_client_attributes_in_order() {
        let lines = checkout_lines();

        let quantities: Vec<u32> = lines.iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, vec![3, 1, 1]);
        assert_eq!(lines[0].attributes["size"], "M");
        assert_eq!(lines[1].attributes["name"], "Dupatta");

        let stored = serde_json::to_value(&lines).unwrap();
        assert_eq!(
            stored[0],
            json!({ "id": 5, "quantity": 3, "size": "M", "color": "indigo", "price": 499 })
        );
    }

    #[test]
    fn total_units_counts_defaulted_quantities() {
        assert_eq!(placed(OrderStatus::Confirmed).total_units(), 5);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let no_user = PlaceOrder {
            items: checkout_lines(),
            total_amount: Some(Money::zero()),
            ..PlaceOrder::default()
        };
        assert_eq!(no_user.validate(), Err(ValidationError::UserIdRequired));

        let no_items = PlaceOrder::new(UserId::new(3), Money::zero(), vec![]);
        assert_eq!(no_items.validate(), Err(ValidationError::NoItems));
    }

    #[test]
    fn negative_total_is_rejected() {
        let cmd = PlaceOrder::new(UserId::new(3), Money::from_minor(-100), checkout_lines());
        assert!(matches!(
            cmd.validate(),
            Err(ValidationError::NegativeAmount { .. })
        ));
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn confirmed_order_ships_then_delivers() {
        let mut order = placed(OrderStatus::Confirmed);

        for (raw, expected) in [("shipped", OrderStatus::Shipped), ("Delivered", OrderStatus::Delivered)] {
            let update = StatusUpdate::parse(Some(raw), None)
                .unwrap()
                .against(&order)
                .unwrap();
            assert_eq!(update.expected_status, order.status);
            order.status = update.status;
            assert_eq!(order.status, expected);
        }

        assert!(order.status.is_terminal());
    }

    #[test]
    fn terminal_orders_cannot_move() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let order = placed(terminal);
            for next in OrderStatus::ALL.into_iter().filter(|s| *s != terminal) {
                let update = StatusUpdate {
                    status: Some(next),
                    tracking_id: None,
                };
                assert!(matches!(
                    update.against(&order),
                    Err(ValidationError::InvalidStatusTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn tracking_only_update_keeps_status() {
        let order = placed(OrderStatus::Shipped);
        let update = StatusUpdate::parse(None, Some("DTDC-7781".to_string()))
            .unwrap()
            .against(&order)
            .unwrap();

        assert_eq!(update.status, OrderStatus::Shipped);
        assert_eq!(update.tracking_id.as_deref(), Some("DTDC-7781"));
    }
}

mod notifications {
    use super::*;

    #[test]
    fn purchaser_and_admin_messages_share_order_metadata() {
        let order = placed(OrderStatus::Confirmed);

        let purchaser = NewNotification::order_placed(&order);
        let admin = NewNotification::order_received(UserId::new(1), &order);

        assert_eq!(purchaser.user_id, UserId::new(3));
        assert_eq!(purchaser.kind, NotificationKind::ORDER);
        assert!(purchaser.description.contains("#42"));
        assert!(purchaser.description.contains("₹1697.00"));

        assert_eq!(admin.user_id, UserId::new(1));
        assert_eq!(admin.kind, NotificationKind::ADMIN_ORDER);
        assert_eq!(purchaser.metadata, json!({ "orderId": 42 }));
        assert_eq!(admin.metadata, purchaser.metadata);
    }
}
