use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domain::{Money, NewProduct, NewUser, OrderLine, PlaceOrder, Role};
use placement::{PlacementCoordinator, StockPolicy};
use store::{InMemoryStore, ProductStore, UserStore};
use tokio::runtime::Runtime;

fn bench_place_order(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("place_order");

    for admins in [0usize, 5, 50] {
        let (coordinator, cmd) = rt.block_on(async {
            let store = InMemoryStore::new();
            let product = store
                .insert_product(NewProduct::new("Kurta", Money::from_minor(49_900), i32::MAX))
                .await
                .unwrap();
            let buyer = store
                .insert_user(NewUser {
                    email: Some("buyer@example.com".to_string()),
                    ..NewUser::default()
                })
                .await
                .unwrap();
            for i in 0..admins {
                let admin = store
                    .insert_user(NewUser {
                        email: Some(format!("admin{i}@example.com")),
                        ..NewUser::default()
                    })
                    .await
                    .unwrap();
                store.set_role(admin.id, Role::Admin).await.unwrap();
            }

            let cmd = PlaceOrder::new(
                buyer.id,
                Money::from_minor(49_900),
                vec![OrderLine::new(product.id, 1)],
            );
            (
                PlacementCoordinator::new(store, StockPolicy::FloorAtZero),
                cmd,
            )
        });

        group.bench_with_input(BenchmarkId::from_parameter(admins), &admins, |b, _| {
            b.to_async(&rt)
                .iter(|| async { coordinator.place_order(cmd.clone()).await.unwrap() });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_place_order);
criterion_main!(benches);
