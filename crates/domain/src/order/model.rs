//! Order records and the commands that create and change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::{Money, OrderId, UserId};

use super::{OrderLine, OrderStatus};

/// A persisted order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub items: Vec<OrderLine>,
    pub shipping_address: Value,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub status: OrderStatus,
    pub tracking_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of units across all lines.
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// A validated order ready to be inserted. Status is always `Confirmed` on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Money,
    pub items: Vec<OrderLine>,
    pub shipping_address: Value,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

/// Command to place an order, as submitted by the checkout client.
#[derive(Debug, Clone, Default)]
pub struct PlaceOrder {
    pub user_id: Option<UserId>,
    pub total_amount: Option<Money>,
    pub items: Vec<OrderLine>,
    pub shipping_address: Value,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

impl PlaceOrder {
    /// Creates a command with the fields every order needs.
    pub fn new(user_id: UserId, total_amount: Money, items: Vec<OrderLine>) -> Self {
        Self {
            user_id: Some(user_id),
            total_amount: Some(total_amount),
            items,
            ..Self::default()
        }
    }

    /// Sets the shipping address.
    pub fn shipping_address(mut self, address: impl Into<Value>) -> Self {
        self.shipping_address = address.into();
        self
    }

    /// Sets the payment method and gateway transaction reference.
    pub fn paid_with(
        mut self,
        payment_method: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        self.payment_method = Some(payment_method.into());
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Validates the command into an insertable order.
    ///
    /// Transaction ids are not checked for uniqueness: submitting the same
    /// payload twice yields two orders.
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        let user_id = self.user_id.ok_or(ValidationError::UserIdRequired)?;
        let total_amount = self
            .total_amount
            .ok_or(ValidationError::Required("Total amount"))?;
        if total_amount.is_negative() {
            return Err(ValidationError::NegativeAmount {
                field: "total amount",
                amount: total_amount.amount().to_string(),
            });
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        Ok(NewOrder {
            user_id,
            total_amount,
            items: self.items,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            transaction_id: self.transaction_id,
        })
    }
}

/// A client request to change an order's status or tracking reference.
///
/// Unset fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub tracking_id: Option<String>,
}

impl StatusUpdate {
    /// Parses the raw status string, if any.
    pub fn parse(
        status: Option<&str>,
        tracking_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let status = status.map(str::parse).transpose()?;
        Ok(Self {
            status,
            tracking_id,
        })
    }

    /// Checks the update against the order's current status.
    pub fn against(&self, current: &Order) -> Result<OrderUpdate, ValidationError> {
        let next = match self.status {
            Some(next) => current.status.transition_to(next)?,
            None => current.status,
        };

        Ok(OrderUpdate {
            expected_status: current.status,
            status: next,
            tracking_id: self.tracking_id.clone(),
        })
    }
}

/// A checked update, applied only if the order is still in `expected_status`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub expected_status: OrderStatus,
    pub status: OrderStatus,
    pub tracking_id: Option<String>,
}
