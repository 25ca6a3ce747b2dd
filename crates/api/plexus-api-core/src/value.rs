//! Value: runtime instances flowing through ports and connections.
//!
//! A rendered node always produces a [`Value::List`]; scalars only appear as
//! literal port values, function arguments and list elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a port or function argument. Used for documentation and
/// default values only; the evaluator never converts between types.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Any,
    Int,
    Float,
    String,
    Boolean,
    Point,
    Color,
    List,
}

impl ValueType {
    /// The literal a freshly created port of this type starts with.
    pub fn default_value(self) -> Value {
        match self {
            ValueType::Any => Value::Null,
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::String => Value::Text(String::new()),
            ValueType::Boolean => Value::Bool(false),
            ValueType::Point => Value::Point([0.0, 0.0]),
            ValueType::Color => Value::Color([0.0, 0.0, 0.0, 1.0]),
            ValueType::List => Value::List(Vec::new()),
        }
    }
}

/// How a port consumes an upstream sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRange {
    /// One element per invocation; sequences are broadcast.
    #[default]
    Single,
    /// The whole sequence is handed to a single invocation.
    List,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Absence of a value. Dropped when returned from a function.
    #[default]
    Null,

    Bool(bool),

    Int(i64),

    Float(f64),

    Text(String),

    /// 2D point (x, y)
    Point([f64; 2]),

    /// RGBA color, components in 0..=1
    Color([f64; 4]),

    /// Ordered sequence, possibly empty, possibly nested.
    List(Vec<Value>),
}

impl Value {
    /// Return the coarse type of this value.
    #[inline]
    pub fn kind(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Any,
            Value::Bool(_) => ValueType::Boolean,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::String,
            Value::Point(_) => ValueType::Point,
            Value::Color(_) => ValueType::Color,
            Value::List(_) => ValueType::List,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Unwrap a list into its elements; any other value becomes a singleton.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            other => vec![other],
        }
    }

    /// Build a list of floats.
    pub fn floats<I: IntoIterator<Item = f64>>(items: I) -> Value {
        Value::List(items.into_iter().map(Value::Float).collect())
    }

    /// Build a list of integers.
    pub fn ints<I: IntoIterator<Item = i64>>(items: I) -> Value {
        Value::List(items.into_iter().map(Value::Int).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Point([x, y]) => write!(f, "{x},{y}"),
            Value::Color([r, g, b, a]) => write!(f, "rgba({r},{g},{b},{a})"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}
