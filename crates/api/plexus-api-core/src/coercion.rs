//! Coercion helpers for function authors.
//!
//! The evaluator hands values to functions exactly as they arrive. Function
//! bodies use these helpers to read the arguments they expect and to report
//! an [`FunctionError::InvalidArgument`] otherwise.

use crate::{FunctionError, Value};

/// Attempt to read a Value as a float.
/// Rules:
/// - Float -> its value
/// - Int -> widened
/// - Bool -> 1.0 / 0.0
/// - Text -> parsed, if it parses
/// - anything else -> None
pub fn to_float(v: &Value) -> Option<f64> {
    match v {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integers truncate floats toward zero.
pub fn to_int(v: &Value) -> Option<i64> {
    match v {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Text(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Every value has a text form; `Null` becomes the empty string.
pub fn to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn to_point(v: &Value) -> Option<[f64; 2]> {
    match v {
        Value::Point(p) => Some(*p),
        Value::Float(_) | Value::Int(_) => to_float(v).map(|x| [x, x]),
        _ => None,
    }
}

fn argument(args: &[Value], index: usize) -> Result<&Value, FunctionError> {
    args.get(index).ok_or(FunctionError::ArgumentCount {
        expected: index + 1,
        found: args.len(),
    })
}

pub fn expect_float(args: &[Value], index: usize) -> Result<f64, FunctionError> {
    let v = argument(args, index)?;
    to_float(v).ok_or_else(|| FunctionError::invalid(index, format!("expected a number, got {v}")))
}

pub fn expect_int(args: &[Value], index: usize) -> Result<i64, FunctionError> {
    let v = argument(args, index)?;
    to_int(v).ok_or_else(|| FunctionError::invalid(index, format!("expected an integer, got {v}")))
}

pub fn expect_bool(args: &[Value], index: usize) -> Result<bool, FunctionError> {
    let v = argument(args, index)?;
    to_bool(v).ok_or_else(|| FunctionError::invalid(index, format!("expected a boolean, got {v}")))
}

pub fn expect_text(args: &[Value], index: usize) -> Result<String, FunctionError> {
    argument(args, index).map(to_text)
}

/// Arguments from `List` ports arrive as lists; a bare scalar is read as a
/// singleton.
pub fn expect_list(args: &[Value], index: usize) -> Result<&[Value], FunctionError> {
    let v = argument(args, index)?;
    Ok(match v {
        Value::List(items) => items,
        other => std::slice::from_ref(other),
    })
}
