// Author: Dustin Pilgrim
// License: MIT

use indexmap::IndexMap;

use super::Value;
use crate::KyoError;

fn type_error(message: String, hint: &str) -> KyoError {
    KyoError::Type {
        message,
        hint: Some(hint.into()),
    }
}

fn expected(kind: &str, value: &Value, hint: &str) -> KyoError {
    type_error(format!("Expected {}, got {}", kind, value.type_name()), hint)
}

/// Integral number within `0..=max`, for the unsigned conversions below.
fn ranged(value: Value, target: &str, max: f64) -> Result<f64, KyoError> {
    match value {
        Value::Number(n) if n >= 0.0 && n < max + 1.0 && n.fract() == 0.0 => Ok(n),
        Value::Number(n) => Err(type_error(
            format!("Number {} out of range for {}", n, target),
            &format!("Use a whole number between 0 and {}", max),
        )),
        other => Err(expected("number", &other, "Use a number value in your document")),
    }
}

impl TryFrom<Value> for String {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(expected("string", &other, "Use a string value in your document")),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(expected("number", &other, "Use a number value in your document")),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            // i64::MAX rounds up to 2^63 as f64, which is already out of range.
            Value::Number(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => Ok(n as i64),
            Value::Number(n) if n.fract() != 0.0 => Err(type_error(
                format!("Number {} is not a whole number", n),
                "Drop the fractional part",
            )),
            Value::Number(n) => Err(type_error(
                format!("Number {} out of range for i64", n),
                "Use a whole number that fits in 64 bits",
            )),
            other => Err(expected("number", &other, "Use a number value in your document")),
        }
    }
}

impl TryFrom<Value> for u16 {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ranged(value, "u16", f64::from(u16::MAX)).map(|n| n as u16)
    }
}

impl TryFrom<Value> for u32 {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ranged(value, "u32", f64::from(u32::MAX)).map(|n| n as u32)
    }
}

impl TryFrom<Value> for usize {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ranged(value, "usize", usize::MAX as f64).map(|n| n as usize)
    }
}

impl TryFrom<Value> for bool {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::String(ref s) if matches!(s.as_str(), "true" | "false" | "yes" | "no") => {
                Err(type_error(
                    format!("Expected boolean, got the string '{}'", s),
                    "Drop the quotes: booleans are true/false/yes/no",
                ))
            }
            other => Err(expected("boolean", &other, "Use true/false or yes/no")),
        }
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = KyoError>,
{
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items.into_iter().map(T::try_from).collect(),
            other => Err(expected("array", &other, "Use an array [...] in your document")),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = KyoError>,
{
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::try_from(v)?)),
        }
    }
}

impl TryFrom<Value> for IndexMap<String, Value> {
    type Error = KyoError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(expected("object", &other, "Use a block or a map in your document")),
        }
    }
}
