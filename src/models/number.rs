//! Serde glue for decimal fields carried as plain JSON numbers.
//!
//! Integral values are written as JSON integers and everything else as a
//! float, so a quantity of `1` goes out as `1` rather than `1.0`.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Number;

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let normalized = value.normalize();
    if normalized.scale() == 0 {
        if let Some(v) = normalized.to_i64() {
            return serializer.serialize_i64(v);
        }
    }
    match value.to_f64() {
        Some(v) => serializer.serialize_f64(v),
        None => Err(S::Error::custom(format!("{} is not representable as f64", value))),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    decimal_from_number(&number)
        .ok_or_else(|| D::Error::custom(format!("number out of range: {}", number)))
}

/// Converts a JSON number into a decimal using its shortest textual form,
/// so `10.2` becomes exactly `10.2` and not the nearest binary fraction.
pub fn decimal_from_number(number: &Number) -> Option<Decimal> {
    if let Some(v) = number.as_i64() {
        return Some(Decimal::from(v));
    }
    if let Some(v) = number.as_u64() {
        return Some(Decimal::from(v));
    }
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
