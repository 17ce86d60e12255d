//! PostgreSQL integration tests
//!
//! These tests start a PostgreSQL container, so they need a running Docker
//! daemon and are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use domain::{
    Money, NewNotification, NewOrder, NewProduct, NewUser, NotificationKind, OrderLine,
    OrderStatus, OrderUpdate, ProductId, Role, UserId,
};
use serde_json::json;
use sqlx::PgPool;
use store::{
    Decrement, NotificationStore, OrderStore, PostgresStore, ProductStore, StoreError, UserStore,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders, products, notifications, users RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn new_order(user_id: UserId, items: Vec<OrderLine>) -> NewOrder {
    NewOrder {
        user_id,
        total_amount: Money::from_minor(149_950),
        items,
        shipping_address: json!({ "street": "12 MG Road", "city": "Pune" }),
        payment_method: Some("UPI".to_string()),
        transaction_id: Some("TXN-1".to_string()),
    }
}

async fn product_with_stock(store: &PostgresStore, stock: i32) -> ProductId {
    store
        .insert_product(NewProduct::new("Silk Saree", Money::from_minor(249_900), stock))
        .await
        .unwrap()
        .id
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_order_round_trips_items() {
    let store = get_test_store().await;
    let items = vec![
        OrderLine::new(ProductId::new(5), 3).with_attribute("size", "M"),
        OrderLine::new(ProductId::new(2), 1),
    ];

    let order = store
        .insert_order(new_order(UserId::new(7), items.clone()))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.items, items);
    assert_eq!(order.total_amount, Money::from_minor(149_950));
    assert_eq!(order.tracking_id, None);

    let loaded = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded, order);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_orders_newest_first() {
    let store = get_test_store().await;
    let first = store
        .insert_order(new_order(UserId::new(1), vec![OrderLine::new(ProductId::new(1), 1)]))
        .await
        .unwrap();
    let second = store
        .insert_order(new_order(UserId::new(2), vec![OrderLine::new(ProductId::new(1), 1)]))
        .await
        .unwrap();

    let all = store.list_orders().await.unwrap();
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);

    let mine = store.list_orders_for_user(UserId::new(1)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, first.id);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn update_order_checks_expected_status() {
    let store = get_test_store().await;
    let order = store
        .insert_order(new_order(UserId::new(1), vec![OrderLine::new(ProductId::new(1), 1)]))
        .await
        .unwrap();

    let stale = OrderUpdate {
        expected_status: OrderStatus::Shipped,
        status: OrderStatus::Delivered,
        tracking_id: None,
    };
    assert!(store.update_order(order.id, stale).await.unwrap().is_none());

    let ship = OrderUpdate {
        expected_status: OrderStatus::Confirmed,
        status: OrderStatus::Shipped,
        tracking_id: Some("AWB-1".to_string()),
    };
    let shipped = store.update_order(order.id, ship).await.unwrap().unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(shipped.tracking_id.as_deref(), Some("AWB-1"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn floored_decrement_never_goes_negative() {
    let store = get_test_store().await;
    let id = product_with_stock(&store, 10).await;

    assert_eq!(
        store.decrement_stock_floored(id, 3).await.unwrap(),
        Decrement::Applied { remaining: 7 }
    );
    assert_eq!(
        store.decrement_stock_floored(id, 20).await.unwrap(),
        Decrement::Applied { remaining: 0 }
    );
    assert_eq!(
        store
            .decrement_stock_floored(ProductId::new(9_999), 1)
            .await
            .unwrap(),
        Decrement::ProductNotFound
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn concurrent_conditional_decrements_do_not_oversell() {
    let store = get_test_store().await;
    let id = product_with_stock(&store, 10).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.decrement_stock_conditional(id, 3).await.unwrap()
        }));
    }

    let mut applied = 0;
    for handle in handles {
        if matches!(handle.await.unwrap(), Decrement::Applied { .. }) {
            applied += 1;
        }
    }

    assert_eq!(applied, 3);
    let product = store.get_product(id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn stock_check_constraint_rejects_negative_values() {
    let store = get_test_store().await;
    let id = product_with_stock(&store, 1).await;

    let result = store.set_stock(id, -5).await;
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn notification_batch_and_read_flag() {
    let store = get_test_store().await;
    let user = UserId::new(3);
    let batch = vec![
        NewNotification::new(user, "One", "First", NotificationKind::ORDER, json!({ "orderId": 1 })),
        NewNotification::new(user, "Two", "Second", NotificationKind::ORDER, json!({ "orderId": 2 })),
    ];

    let stored = store.insert_notifications(batch).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|n| !n.is_read));

    let listed = store.list_notifications_for_user(user).await.unwrap();
    assert_eq!(listed[0].title, "Two");
    assert_eq!(listed[0].metadata, json!({ "orderId": 2 }));

    assert_eq!(store.mark_all_read(user).await.unwrap(), 2);
    let listed = store.list_notifications_for_user(user).await.unwrap();
    assert!(listed.iter().all(|n| n.is_read));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn admin_ids_reflect_current_roles() {
    let store = get_test_store().await;
    let owner = store
        .insert_user(NewUser {
            name: Some("Owner".to_string()),
            email: Some("owner@example.com".to_string()),
            phone: None,
        })
        .await
        .unwrap();
    let shopper = store
        .insert_user(NewUser {
            phone: Some("9876543210".to_string()),
            ..NewUser::default()
        })
        .await
        .unwrap();

    assert_eq!(owner.role, Role::User);
    assert!(store.list_admin_ids().await.unwrap().is_empty());

    store.set_role(owner.id, Role::Admin).await.unwrap();
    assert_eq!(store.list_admin_ids().await.unwrap(), vec![owner.id]);
    assert_eq!(
        store.get_user(shopper.id).await.unwrap().unwrap().role,
        Role::User
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn concurrent_registrations_with_same_phone_keep_one_user() {
    let store = get_test_store().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_user(NewUser {
                        name: Some(format!("Shopper {i}")),
                        phone: Some("9876543210".to_string()),
                        ..NewUser::default()
                    })
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, StoreError::AlreadyExists("User"))),
        }
    }
    assert_eq!(created, 1);
}
