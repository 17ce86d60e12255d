//! Storefront HTTP API.
//!
//! REST endpoints for orders, products, notifications and users over a
//! [`Store`], with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use placement::{PlacementCoordinator, StockPolicy};
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/orders",
            post(routes::orders::create::<S>).get(routes::orders::list::<S>),
        )
        // GET takes a user id, PUT an order id
        .route(
            "/orders/{id}",
            get(routes::orders::list_for_user::<S>).put(routes::orders::update::<S>),
        )
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}/stock", put(routes::products::set_stock::<S>))
        .route("/notifications", post(routes::notifications::create::<S>))
        .route(
            "/notifications/{user_id}",
            get(routes::notifications::list::<S>),
        )
        .route(
            "/notifications/read/{user_id}",
            put(routes::notifications::mark_read::<S>),
        )
        .route("/users", post(routes::users::register::<S>))
        .route("/users/{id}/role", put(routes::users::set_role::<S>));

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store.
pub fn create_default_state<S: Store>(store: S, stock_policy: StockPolicy) -> Arc<AppState<S>> {
    Arc::new(AppState {
        coordinator: PlacementCoordinator::new(store.clone(), stock_policy),
        store,
    })
}
