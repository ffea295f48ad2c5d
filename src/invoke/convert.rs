//! Value conversion
//!
//! Converts text gathered from attributes and body text into the parameter
//! types a method declares.

use super::value::{Value, ValueType};

/// Convert `value` to `target`
///
/// Strings parse into booleans and numbers, numbers and booleans format into
/// strings, `Int` widens to `Float`. Objects only convert to their own type
/// or to `Any`.
pub fn convert(value: Value, target: ValueType) -> Result<Value, String> {
    if target == ValueType::Any || value.value_type() == target {
        return Ok(value);
    }

    match (value, target) {
        (Value::Str(s), ValueType::Bool) => {
            parse_bool(&s).map(Value::Bool).ok_or_else(|| mismatch(&s, target))
        }
        (Value::Str(s), ValueType::Int) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| mismatch(&s, target)),
        (Value::Str(s), ValueType::Float) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| mismatch(&s, target)),
        (Value::Int(i), ValueType::Float) => Ok(Value::Float(i as f64)),
        (Value::Int(i), ValueType::Str) => Ok(Value::Str(i.to_string())),
        (Value::Float(x), ValueType::Str) => Ok(Value::Str(x.to_string())),
        (Value::Bool(b), ValueType::Str) => Ok(Value::Str(b.to_string())),
        (other, target) => Err(format!(
            "cannot convert {} to {target}",
            other.value_type()
        )),
    }
}

fn mismatch(text: &str, target: ValueType) -> String {
    format!("cannot convert {text:?} to {target}")
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "1" => Some(true),
        "false" | "no" | "off" | "n" | "0" => Some(false),
        _ => None,
    }
}
