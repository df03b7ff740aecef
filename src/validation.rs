//! Rule set applied to create and update bodies.
//!
//! Fields are checked in a fixed order (`name`, `quantity`, `price`,
//! `productType`, then unknown keys) and the first failure wins. Messages
//! quote the offending field, e.g. `"name" is required`.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{number::decimal_from_number, ProductType, PurchaseInput};

const NAME_MIN_CHARS: usize = 3;
const PRICE_MAX_SCALE: u32 = 2;
const KNOWN_FIELDS: [&str; 4] = ["name", "quantity", "price", "productType"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn required(field: &str) -> Self {
        Self::new(format!("\"{}\" is required", field))
    }
}

/// Checks an arbitrary JSON body against the purchase rules.
pub fn validate_purchase(body: &Value) -> Result<PurchaseInput, ValidationError> {
    let fields = body
        .as_object()
        .ok_or_else(|| ValidationError::new("\"value\" must be of type object"))?;

    let name = validate_name(fields)?;
    let quantity = validate_quantity(fields)?;
    let price = validate_price(fields)?;
    let product_type = validate_product_type(fields)?;
    reject_unknown(fields)?;

    Ok(PurchaseInput {
        name,
        quantity,
        price,
        product_type,
    })
}

fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a Value, ValidationError> {
    fields.get(name).ok_or_else(|| ValidationError::required(name))
}

fn string_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a str, ValidationError> {
    field(fields, name)?
        .as_str()
        .ok_or_else(|| ValidationError::new(format!("\"{}\" must be a string", name)))
}

fn number_field(fields: &Map<String, Value>, name: &str) -> Result<Decimal, ValidationError> {
    match field(fields, name)? {
        Value::Number(n) => decimal_from_number(n)
            .ok_or_else(|| ValidationError::new(format!("\"{}\" must be a safe number", name))),
        _ => Err(ValidationError::new(format!("\"{}\" must be a number", name))),
    }
}

fn validate_name(fields: &Map<String, Value>) -> Result<String, ValidationError> {
    let name = string_field(fields, "name")?;
    if name.chars().count() < NAME_MIN_CHARS {
        return Err(ValidationError::new(format!(
            "\"name\" length must be at least {} characters long",
            NAME_MIN_CHARS
        )));
    }
    Ok(name.to_string())
}

fn validate_quantity(fields: &Map<String, Value>) -> Result<Decimal, ValidationError> {
    let quantity = number_field(fields, "quantity")?;
    if quantity < Decimal::ONE {
        return Err(ValidationError::new(
            "\"quantity\" must be greater than or equal to 1",
        ));
    }
    Ok(quantity)
}

fn validate_price(fields: &Map<String, Value>) -> Result<Decimal, ValidationError> {
    let price = number_field(fields, "price")?;
    if price.normalize().scale() > PRICE_MAX_SCALE {
        return Err(ValidationError::new(format!(
            "\"price\" must have no more than {} decimal places",
            PRICE_MAX_SCALE
        )));
    }
    if price < Decimal::new(1, PRICE_MAX_SCALE) {
        return Err(ValidationError::new(
            "\"price\" must be greater than or equal to 0.01",
        ));
    }
    Ok(price)
}

fn validate_product_type(fields: &Map<String, Value>) -> Result<ProductType, ValidationError> {
    let value = string_field(fields, "productType")?;
    ProductType::parse(value).ok_or_else(|| {
        let allowed: Vec<&str> = ProductType::ALL.iter().map(|t| t.as_str()).collect();
        ValidationError::new(format!(
            "\"productType\" must be one of [{}]",
            allowed.join(", ")
        ))
    })
}

fn reject_unknown(fields: &Map<String, Value>) -> Result<(), ValidationError> {
    match fields.keys().find(|k| !KNOWN_FIELDS.contains(&k.as_str())) {
        Some(key) => Err(ValidationError::new(format!("\"{}\" is not allowed", key))),
        None => Ok(()),
    }
}
