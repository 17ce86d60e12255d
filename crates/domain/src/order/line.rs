//! Order line items.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ProductId;

/// One line of an order: a product and how many units were bought.
///
/// Clients send extra per-line attributes (size, colour, name, price). Those
/// are kept verbatim in `attributes` and stored alongside `id` and `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The product bought.
    pub id: ProductId,

    /// Units bought. An omitted, null or zero quantity means one unit.
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_one")]
    pub quantity: u32,

    /// Remaining attributes as sent by the client.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl OrderLine {
    /// Creates a line without extra attributes.
    pub fn new(id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity: quantity.max(1),
            attributes: Map::new(),
        }
    }

    /// Adds a client attribute such as `size` or `color`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

fn default_quantity() -> u32 {
    1
}

fn quantity_or_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = Option::<u32>::deserialize(deserializer)?;
    Ok(match quantity {
        None | Some(0) => 1,
        Some(q) => q,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let line: OrderLine = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_null_and_zero_quantity_default_to_one() {
        let null: OrderLine = serde_json::from_str(r#"{"id": 5, "quantity": null}"#).unwrap();
        let zero: OrderLine = serde_json::from_str(r#"{"id": 5, "quantity": 0}"#).unwrap();
        assert_eq!(null.quantity, 1);
        assert_eq!(zero.quantity, 1);
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let result = serde_json::from_str::<OrderLine>(r#"{"id": 5, "quantity": -2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_attributes_are_preserved() {
        let json = serde_json::json!({
            "id": 5,
            "quantity": 3,
            "size": "M",
            "price": 499
        });
        let line: OrderLine = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(line.id, ProductId::new(5));
        assert_eq!(line.quantity, 3);
        assert_eq!(line.attributes["size"], "M");

        assert_eq!(serde_json::to_value(&line).unwrap(), json);
    }

    #[test]
    fn test_new_clamps_zero_quantity() {
        assert_eq!(OrderLine::new(ProductId::new(1), 0).quantity, 1);
        let line = OrderLine::new(ProductId::new(1), 4).with_attribute("color", "red");
        assert_eq!(line.quantity, 4);
        assert_eq!(line.attributes.len(), 1);
    }
}
