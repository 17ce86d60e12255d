//! Catalogue products and their stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{Money, ProductId};

/// A persisted product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    /// Units on hand. Never negative.
    pub stock_quantity: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// A product to add to the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "available_by_default")]
    pub is_available: bool,
}

fn available_by_default() -> bool {
    true
}

impl NewProduct {
    /// Creates an available product.
    pub fn new(name: impl Into<String>, price: Money, stock_quantity: i32) -> Self {
        Self {
            name: name.into(),
            price,
            stock_quantity,
            is_available: true,
        }
    }

    /// Rejects blank names, negative prices and negative stock.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("Product name"));
        }
        if self.price.is_negative() {
            return Err(ValidationError::NegativeAmount {
                field: "price",
                amount: self.price.amount().to_string(),
            });
        }
        validate_stock(self.stock_quantity)?;
        Ok(self)
    }
}

/// Rejects negative stock quantities.
pub fn validate_stock(quantity: i32) -> Result<i32, ValidationError> {
    if quantity < 0 {
        Err(ValidationError::NegativeStock(quantity))
    } else {
        Ok(quantity)
    }
}
