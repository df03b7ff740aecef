use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod number;
pub mod write;

pub use write::PurchaseInput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: u64,
    pub name: String,
    #[serde(with = "number")]
    pub quantity: Decimal,
    #[serde(with = "number")]
    pub price: Decimal,
    pub product_type: ProductType,
}

impl Purchase {
    pub fn new(id: u64, input: PurchaseInput) -> Self {
        Self {
            id,
            name: input.name,
            quantity: input.quantity,
            price: input.price,
            product_type: input.product_type,
        }
    }

    /// Overwrites every field except `id`.
    pub fn apply(&mut self, input: PurchaseInput) {
        self.name = input.name;
        self.price = input.price;
        self.quantity = input.quantity;
        self.product_type = input.product_type;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Toy,
    Hardware,
    Book,
    Clothing,
}

impl ProductType {
    pub const ALL: [ProductType; 4] = [
        ProductType::Toy,
        ProductType::Hardware,
        ProductType::Book,
        ProductType::Clothing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Toy => "toy",
            ProductType::Hardware => "hardware",
            ProductType::Book => "book",
            ProductType::Clothing => "clothing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
