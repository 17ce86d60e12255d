//! Stock adjustment step.

use std::str::FromStr;

use common::ProductId;
use domain::Order;
use store::{Decrement, ProductStore};
use thiserror::Error;

/// How stock is lowered when an order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// `new = max(0, old - quantity)`. Never negative, never checked against
    /// availability, so concurrent orders can oversell.
    #[default]
    FloorAtZero,

    /// Lower stock only if enough units are on hand, in one statement. A line
    /// that does not fit leaves stock untouched and is reported.
    Conditional,
}

impl StockPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::FloorAtZero => "floor",
            StockPolicy::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised `STOCK_POLICY` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown stock policy: {0} (expected `floor` or `conditional`)")]
pub struct UnknownStockPolicy(pub String);

impl FromStr for StockPolicy {
    type Err = UnknownStockPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "floor" | "floor_at_zero" => Ok(StockPolicy::FloorAtZero),
            "conditional" => Ok(StockPolicy::Conditional),
            _ => Err(UnknownStockPolicy(s.to_string())),
        }
    }
}

/// What happened to one order line's stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockOutcome {
    Adjusted { remaining: i32 },
    InsufficientStock { available: i32 },
    ProductNotFound,
    Failed(String),
}

impl StockOutcome {
    fn label(&self) -> &'static str {
        match self {
            StockOutcome::Adjusted { .. } => "adjusted",
            StockOutcome::InsufficientStock { .. } => "insufficient_stock",
            StockOutcome::ProductNotFound => "product_not_found",
            StockOutcome::Failed(_) => "failed",
        }
    }
}

/// Stock outcome for one line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAdjustment {
    pub product_id: ProductId,
    pub quantity: u32,
    pub outcome: StockOutcome,
}

/// Per-line outcomes of a stock adjustment, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockReport {
    pub lines: Vec<LineAdjustment>,
}

impl StockReport {
    /// Lines whose stock was not lowered as requested.
    pub fn failures(&self) -> impl Iterator<Item = &LineAdjustment> {
        self.lines
            .iter()
            .filter(|line| !matches!(line.outcome, StockOutcome::Adjusted { .. }))
    }

    /// Returns true if every line was adjusted.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Lowers product stock for placed orders.
#[derive(Clone)]
pub struct StockAdjustment<S> {
    store: S,
    policy: StockPolicy,
}

impl<S: ProductStore> StockAdjustment<S> {
    pub fn new(store: S, policy: StockPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Lowers one product's stock according to the policy.
    pub async fn decrement_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> store::Result<Decrement> {
        match self.policy {
            StockPolicy::FloorAtZero => {
                self.store
                    .decrement_stock_floored(product_id, quantity)
                    .await
            }
            StockPolicy::Conditional => {
                self.store
                    .decrement_stock_conditional(product_id, quantity)
                    .await
            }
        }
    }

    /// Adjusts stock for every line of the order.
    ///
    /// Never fails: each line is attempted independently and problems are
    /// logged, counted and returned in the report. There is no retry and no
    /// compensation.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, policy = %self.policy))]
    pub async fn adjust(&self, order: &Order) -> StockReport {
        let mut report = StockReport::default();

        for line in &order.items {
            let outcome = match self.decrement_stock(line.id, line.quantity).await {
                Ok(Decrement::Applied { remaining }) => StockOutcome::Adjusted { remaining },
                Ok(Decrement::InsufficientStock { available }) => {
                    StockOutcome::InsufficientStock { available }
                }
                Ok(Decrement::ProductNotFound) => StockOutcome::ProductNotFound,
                Err(e) => StockOutcome::Failed(e.to_string()),
            };

            metrics::counter!("stock_decrements_total", "outcome" => outcome.label())
                .increment(1);

            match &outcome {
                StockOutcome::Adjusted { remaining } => {
                    tracing::debug!(
                        product_id = %line.id,
                        quantity = line.quantity,
                        remaining,
                        "stock adjusted"
                    );
                }
                StockOutcome::Failed(error) => {
                    tracing::warn!(
                        product_id = %line.id,
                        quantity = line.quantity,
                        %error,
                        "failed to update stock quantity"
                    );
                }
                other => {
                    tracing::warn!(
                        product_id = %line.id,
                        quantity = line.quantity,
                        outcome = other.label(),
                        "stock not adjusted"
                    );
                }
            }

            report.lines.push(LineAdjustment {
                product_id: line.id,
                quantity: line.quantity,
                outcome,
            });
        }

        report
    }
}
