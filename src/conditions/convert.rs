//! coercions between runtime values

use super::error::{ConditionError, ConditionResult};
use super::types::Value;

/// canonical string form of a value
///
/// integral numbers print without a decimal point (`42.0` -> `42`), other
/// numbers in their shortest form.
pub fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_to_string(*n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == n.trunc() {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// coerce to an integer, truncating toward zero
///
/// strings are parsed as integers first and as decimals second; booleans
/// map to 1 and 0.
pub fn to_int(value: &Value) -> ConditionResult<i64> {
    match value {
        Value::Number(n) if n.is_finite() => Ok(n.trunc() as i64),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(n);
            }
            match text.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n.trunc() as i64),
                _ => Err(ConditionError::type_error(format!(
                    "cannot convert '{}' to an integer",
                    s
                ))),
            }
        }
        other => Err(ConditionError::type_error(format!(
            "cannot convert {} to an integer",
            other.type_name()
        ))),
    }
}

/// coerce to a double for arithmetic and relational operators
pub fn to_double(value: &Value) -> ConditionResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            ConditionError::type_error(format!("'{}' is not a number", s))
        }),
        other => Err(ConditionError::type_error(format!(
            "expected a number, got {}",
            other.type_name()
        ))),
    }
}

/// truthiness used by `&&`, `||`, `not` and `if`
pub fn to_boolean(value: &Value) -> bool {
    value.is_truthy()
}
