//! The function capability invoked by graph nodes.
//!
//! A [`Function`] declares an ordered list of [`Argument`]s and is invoked
//! with exactly that many values. Functions never see ports, connections or
//! the broadcasting machinery; they receive one tuple of values at a time
//! together with the [`CallContext`] of the current render.

use std::fmt;

use hashbrown::HashMap;

use crate::{FunctionError, PortRange, Value, ValueType};

/// One declared argument of a function.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value_type: ValueType,
    pub range: PortRange,
    pub default: Option<Value>,
}

impl Argument {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Argument {
            name: name.into(),
            value_type,
            range: PortRange::Single,
            default: None,
        }
    }

    /// Consume whole sequences instead of broadcasting over them.
    pub fn list(mut self) -> Self {
        self.range = PortRange::List;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The literal a port created for this argument starts with.
    pub fn default_value(&self) -> Value {
        match &self.default {
            Some(v) => v.clone(),
            None if self.range == PortRange::List => Value::List(Vec::new()),
            None => self.value_type.default_value(),
        }
    }
}

/// Explicit per-render context handed to every invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct CallContext {
    frame: f64,
    data: HashMap<String, Value>,
}

impl Default for CallContext {
    fn default() -> Self {
        CallContext {
            frame: 1.0,
            data: HashMap::new(),
        }
    }
}

impl CallContext {
    pub fn new(frame: f64) -> Self {
        CallContext {
            frame,
            ..Default::default()
        }
    }

    #[inline]
    pub fn frame(&self) -> f64 {
        self.frame
    }

    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set_frame(&mut self, frame: f64) {
        self.frame = frame;
    }

    pub fn insert_data(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }
}

/// A named, typed unit of computation.
pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    fn arguments(&self) -> &[Argument];

    fn output_type(&self) -> ValueType {
        ValueType::Any
    }

    fn output_range(&self) -> PortRange {
        PortRange::Single
    }

    /// Run the function once. Returning [`Value::Null`] produces no result.
    fn invoke(&self, ctx: &CallContext, args: &[Value]) -> Result<Value, FunctionError>;
}

type NativeBody = dyn Fn(&CallContext, &[Value]) -> Result<Value, FunctionError> + Send + Sync;

/// [`Function`] backed by a Rust closure.
pub struct NativeFunction {
    name: String,
    arguments: Vec<Argument>,
    output_type: ValueType,
    output_range: PortRange,
    body: Box<NativeBody>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, arguments: Vec<Argument>, body: F) -> Self
    where
        F: Fn(&CallContext, &[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        NativeFunction {
            name: name.into(),
            arguments,
            output_type: ValueType::Any,
            output_range: PortRange::Single,
            body: Box::new(body),
        }
    }

    pub fn returns(mut self, output_type: ValueType, output_range: PortRange) -> Self {
        self.output_type = output_type;
        self.output_range = output_range;
        self
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("output_type", &self.output_type)
            .field("output_range", &self.output_range)
            .finish_non_exhaustive()
    }
}

impl Function for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn output_type(&self) -> ValueType {
        self.output_type
    }

    fn output_range(&self) -> PortRange {
        self.output_range
    }

    fn invoke(&self, ctx: &CallContext, args: &[Value]) -> Result<Value, FunctionError> {
        if args.len() != self.arguments.len() {
            return Err(FunctionError::ArgumentCount {
                expected: self.arguments.len(),
                found: args.len(),
            });
        }
        (self.body)(ctx, args)
    }
}
