//! Turning port sources into function invocations.
//!
//! Every input port contributes a [`Slot`]: either a single value reused for
//! every invocation, or a stream of values. Streams are consumed according to
//! the port range and their nesting level:
//!
//! - a `List` port takes a flat stream whole, as one list argument;
//! - every other stream is broadcast, cycling shorter streams up to the length
//!   of the longest one;
//! - a stream of lists on a `Single` port (or a deeper stream on any port) is
//!   mapped one outer element at a time, recursing until the remaining streams
//!   are flat. Results keep that nesting.

use std::cell::Cell;

use plexus_api_core::{CallContext, Function, PortRange, Value};

use crate::error::RenderError;
use crate::node::Node;
use crate::port::Port;
use crate::types::NodePath;

/// Where a port's value comes from during one render.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Source {
    /// The rendered value of an upstream node. Always a list.
    Connected(Value),
    /// A port literal or override.
    Literal(Value),
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Slot<'s> {
    Single(&'s Value),
    Stream(&'s [Value]),
}

impl<'s> Slot<'s> {
    pub(crate) fn new(port: &Port, source: &'s Source) -> Slot<'s> {
        match (source, port.range()) {
            (Source::Connected(Value::List(items)), _) => Slot::Stream(items),
            (Source::Connected(other), _) => Slot::Single(other),
            (Source::Literal(v), PortRange::Single) => Slot::Single(v),
            (Source::Literal(Value::List(items)), PortRange::List) => Slot::Stream(items),
            (Source::Literal(v), PortRange::List) => Slot::Stream(std::slice::from_ref(v)),
        }
    }

    fn level(&self) -> usize {
        match self {
            Slot::Single(_) => 0,
            Slot::Stream(items) => nesting_level(items),
        }
    }
}

/// Nesting depth measured through first elements: `[1, 2]` is 0,
/// `[[1], [2]]` is 1.
pub(crate) fn nesting_level(items: &[Value]) -> usize {
    let mut level = 0;
    let mut current = items;
    while let Some(Value::List(inner)) = current.first() {
        level += 1;
        current = inner;
    }
    level
}

pub(crate) struct Broadcast<'a> {
    node: &'a Node,
    function: &'a dyn Function,
    call: &'a CallContext,
    path: &'a NodePath,
    function_id: &'a str,
    invocations: Cell<usize>,
}

impl<'a> Broadcast<'a> {
    pub(crate) fn new(
        node: &'a Node,
        function: &'a dyn Function,
        call: &'a CallContext,
        path: &'a NodePath,
        function_id: &'a str,
    ) -> Self {
        Broadcast {
            node,
            function,
            call,
            path,
            function_id,
            invocations: Cell::new(0),
        }
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.get()
    }

    /// Produce the node's sequence for one set of slots.
    pub(crate) fn map_values(&self, slots: &[Slot<'_>]) -> Result<Vec<Value>, RenderError> {
        let results: Vec<Value> = if slots.is_empty() {
            self.invoke(&[])?.into_iter().collect()
        } else if self.is_flat(slots) {
            self.map_flat(slots)?
        } else {
            self.map_nested(slots)?
        };
        Ok(self.shape(results))
    }

    fn is_flat(&self, slots: &[Slot<'_>]) -> bool {
        let total: usize = slots.iter().map(Slot::level).sum();
        total == 0
            || (total == 1
                && slots
                    .iter()
                    .zip(self.node.inputs())
                    .any(|(slot, port)| port.is_list_range() && slot.level() == 1))
    }

    fn map_flat(&self, slots: &[Slot<'_>]) -> Result<Vec<Value>, RenderError> {
        let ports = self.node.inputs();
        let mut count = 1;
        for (slot, port) in slots.iter().zip(ports) {
            if let Slot::Stream(items) = slot {
                if takes_whole(port, slot) {
                    continue;
                }
                if items.is_empty() {
                    return Ok(Vec::new());
                }
                count = count.max(items.len());
            }
        }

        let mut results = Vec::with_capacity(count);
        let mut args = Vec::with_capacity(slots.len());
        for i in 0..count {
            args.clear();
            for (slot, port) in slots.iter().zip(ports) {
                let arg = match slot {
                    Slot::Single(v) => port.clamp((*v).clone()),
                    Slot::Stream(items) if takes_whole(port, slot) => Value::List(items.to_vec()),
                    Slot::Stream(items) => port.clamp(items[i % items.len()].clone()),
                };
                args.push(arg);
            }
            results.extend(self.invoke(&args)?);
        }
        Ok(results)
    }

    fn map_nested(&self, slots: &[Slot<'_>]) -> Result<Vec<Value>, RenderError> {
        let Some((index, items)) = slots.iter().enumerate().find_map(|(i, slot)| match slot {
            Slot::Stream(items) if slot.level() > 0 => Some((i, *items)),
            _ => None,
        }) else {
            return self.map_flat(slots);
        };

        let inline = self.node.output_range() == PortRange::Single && self.node.has_list_inputs();
        let mut nested = slots.to_vec();
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            nested[index] = match item {
                Value::List(inner) => Slot::Stream(inner),
                other => Slot::Single(other),
            };
            let mut inner = self.map_values(&nested)?;
            if inline && inner.len() == 1 {
                results.extend(inner.pop());
            } else {
                results.push(Value::List(inner));
            }
        }
        Ok(results)
    }

    /// A `List` output made of one invocation is that invocation's list.
    fn shape(&self, mut results: Vec<Value>) -> Vec<Value> {
        if self.node.output_range() == PortRange::List && results.len() == 1 {
            return results.pop().map(Value::into_items).unwrap_or_default();
        }
        results
    }

    fn invoke(&self, args: &[Value]) -> Result<Option<Value>, RenderError> {
        self.invocations.set(self.invocations.get() + 1);
        match self.function.invoke(self.call, args) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(RenderError::Invocation {
                path: self.path.clone(),
                function: self.function_id.to_string(),
                source,
            }),
        }
    }
}

fn takes_whole(port: &Port, slot: &Slot<'_>) -> bool {
    port.is_list_range() && slot.level() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_level_follows_first_elements() {
        assert_eq!(nesting_level(&[]), 0);
        assert_eq!(nesting_level(&[Value::Int(1)]), 0);
        assert_eq!(nesting_level(&[Value::ints([1]), Value::Int(2)]), 1);
        assert_eq!(nesting_level(&[Value::List(vec![Value::ints([1])])]), 2);
        assert_eq!(nesting_level(&[Value::List(vec![])]), 1);
    }

    #[test]
    fn literals_on_list_ports_become_streams() {
        let list_port = Port::list("values", plexus_api_core::ValueType::Float);
        let scalar = Source::Literal(Value::Float(3.0));
        assert!(matches!(Slot::new(&list_port, &scalar), Slot::Stream(items) if items.len() == 1));
        let list = Source::Literal(Value::floats([1.0, 2.0]));
        assert!(matches!(Slot::new(&list_port, &list), Slot::Stream(items) if items.len() == 2));
        let single_port = Port::float("v", 0.0);
        assert!(matches!(Slot::new(&single_port, &list), Slot::Single(Value::List(_))));
    }
}
