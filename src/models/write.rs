use rust_decimal::Decimal;

use super::ProductType;

/// Validated body of a create or update request.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseInput {
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub product_type: ProductType,
}
