//! Input ports.

use plexus_api_core::json::{deserialize_optional_value, deserialize_value};
use plexus_api_core::{PortRange, Value, ValueType};
use serde::{Deserialize, Serialize};

/// The child port a published network port stands in for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildReference {
    pub node: String,
    pub port: String,
}

impl ChildReference {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        ChildReference {
            node: node.into(),
            port: port.into(),
        }
    }

    pub fn matches(&self, node: &str, port: &str) -> bool {
        self.node == node && self.port == port
    }
}

/// A named input slot on a node.
///
/// The literal is the override value when one is set, otherwise the default.
/// A connected port ignores its literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
    name: String,
    #[serde(rename = "type", default)]
    value_type: ValueType,
    #[serde(default)]
    range: PortRange,
    #[serde(default, deserialize_with = "deserialize_value")]
    default: Value,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_value"
    )]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child_reference: Option<ChildReference>,
}

impl Port {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Port {
            name: name.into(),
            value_type,
            range: PortRange::Single,
            default: value_type.default_value(),
            value: None,
            minimum: None,
            maximum: None,
            child_reference: None,
        }
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Port::new(name, ValueType::Float).with_default(Value::Float(default))
    }

    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Port::new(name, ValueType::Int).with_default(Value::Int(default))
    }

    pub fn string(name: impl Into<String>, default: &str) -> Self {
        Port::new(name, ValueType::String).with_default(Value::from(default))
    }

    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Port::new(name, ValueType::Boolean).with_default(Value::Bool(default))
    }

    /// A `List`-range port starting out empty.
    pub fn list(name: impl Into<String>, value_type: ValueType) -> Self {
        Port::new(name, value_type)
            .with_range(PortRange::List)
            .with_default(Value::List(Vec::new()))
    }

    pub fn with_range(mut self, range: PortRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Set the override literal.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Drop the override literal.
    pub fn reset(mut self) -> Self {
        self.value = None;
        self
    }

    pub fn with_bounds(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The network-side copy of this port, published under `name`.
    pub fn published_as(&self, name: &str, child: &str) -> Port {
        Port {
            name: name.to_string(),
            value_type: self.value_type,
            range: self.range,
            default: self.value().clone(),
            value: None,
            minimum: self.minimum,
            maximum: self.maximum,
            child_reference: Some(ChildReference::new(child, self.name.as_str())),
        }
    }

    pub(crate) fn with_child_reference(mut self, reference: Option<ChildReference>) -> Self {
        self.child_reference = reference;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    #[inline]
    pub fn is_list_range(&self) -> bool {
        self.range == PortRange::List
    }

    /// The effective literal.
    pub fn value(&self) -> &Value {
        self.value.as_ref().unwrap_or(&self.default)
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn has_override(&self) -> bool {
        self.value.is_some()
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn child_reference(&self) -> Option<&ChildReference> {
        self.child_reference.as_ref()
    }

    pub fn is_published(&self) -> bool {
        self.child_reference.is_some()
    }

    /// Clamp numeric scalars to the declared bounds. Other values pass through.
    pub fn clamp(&self, value: Value) -> Value {
        if self.minimum.is_none() && self.maximum.is_none() {
            return value;
        }
        match value {
            Value::Float(f) => Value::Float(self.clamp_f64(f)),
            Value::Int(i) => {
                let clamped = self.clamp_f64(i as f64);
                if clamped == i as f64 {
                    Value::Int(i)
                } else {
                    Value::Int(clamped.round() as i64)
                }
            }
            other => other,
        }
    }

    fn clamp_f64(&self, x: f64) -> f64 {
        let x = self.minimum.map_or(x, |min| x.max(min));
        self.maximum.map_or(x, |max| x.min(max))
    }
}
