//! Product entity.

use serde::{Deserialize, Serialize};
use sku_data::Entity;

use crate::bulk::{FieldSpec, FieldValue};
use crate::money::Money;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned key; 0 until committed.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Price per unit.
    pub price: Money,
}

impl Product {
    /// Create a product not yet persisted.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            id: 0,
            name: name.into(),
            price,
        }
    }

    /// Fields a candidate must carry to be inserted.
    pub fn required_fields() -> [FieldSpec<Product>; 2] {
        [
            FieldSpec {
                name: "name",
                get: |p| FieldValue::Text(p.name.clone()),
            },
            FieldSpec {
                name: "price",
                get: |p| FieldValue::Money(p.price.amount_cents),
            },
        ]
    }

    /// Fields whose equality marks a candidate as a duplicate.
    pub fn unique_fields() -> [FieldSpec<Product>; 1] {
        [FieldSpec {
            name: "name",
            get: |p| FieldValue::Text(p.name.clone()),
        }]
    }
}

impl Entity for Product {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn label(&self) -> String {
        format!("product '{}'", self.name)
    }
}
