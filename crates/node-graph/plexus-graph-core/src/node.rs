//! Immutable node descriptions.
//!
//! A [`Node`] is never edited in place. Every `with_*` method (and the
//! network operations in [`crate::network`]) returns a new node; children are
//! shared through [`Arc`] so a derived network only copies what changed.

use std::sync::Arc;

use plexus_api_core::{PortRange, Value, ValueType};
use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::error::GraphError;
use crate::port::Port;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) function: Option<String>,
    #[serde(default)]
    pub(crate) inputs: Vec<Port>,
    #[serde(default)]
    pub(crate) output_type: ValueType,
    #[serde(default)]
    pub(crate) output_range: PortRange,
    #[serde(default)]
    pub(crate) network: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) children: Vec<Arc<Node>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) rendered_child: Option<String>,
}

impl Node {
    /// A leaf node without function or ports.
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            function: None,
            inputs: Vec::new(),
            output_type: ValueType::Any,
            output_range: PortRange::Single,
            network: false,
            children: Vec::new(),
            connections: Vec::new(),
            rendered_child: None,
        }
    }

    /// An empty network.
    pub fn network(name: impl Into<String>) -> Self {
        Node {
            network: true,
            ..Node::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function identifier in `namespace/name` form.
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name() == name)
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.input(name).is_some()
    }

    /// True if any input consumes whole sequences.
    pub fn has_list_inputs(&self) -> bool {
        self.inputs.iter().any(Port::is_list_range)
    }

    pub fn output_type(&self) -> ValueType {
        self.output_type
    }

    pub fn output_range(&self) -> PortRange {
        self.output_range
    }

    pub fn is_network(&self) -> bool {
        self.network
    }

    pub fn with_name(&self, name: impl Into<String>) -> Node {
        Node {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_function(&self, function: impl Into<String>) -> Node {
        Node {
            function: Some(function.into()),
            ..self.clone()
        }
    }

    pub fn with_output_type(&self, output_type: ValueType) -> Node {
        Node {
            output_type,
            ..self.clone()
        }
    }

    pub fn with_output_range(&self, output_range: PortRange) -> Node {
        Node {
            output_range,
            ..self.clone()
        }
    }

    /// Append a port. Port names are unique per node.
    pub fn with_input(&self, port: Port) -> Result<Node, GraphError> {
        if self.has_input(port.name()) {
            return Err(GraphError::DuplicatePort {
                node: self.name.clone(),
                port: port.name().to_string(),
            });
        }
        let mut next = self.clone();
        next.inputs.push(port);
        Ok(next)
    }

    /// Remove a port. On a network, removing a published port unpublishes it.
    pub fn with_input_removed(&self, name: &str) -> Result<Node, GraphError> {
        let index = self.input_index(name)?;
        let mut next = self.clone();
        next.inputs.remove(index);
        Ok(next)
    }

    /// Replace the port called `name`. The replacement may carry a new name as
    /// long as it does not collide with another port.
    pub fn with_input_changed(&self, name: &str, port: Port) -> Result<Node, GraphError> {
        let index = self.input_index(name)?;
        if port.name() != name && self.has_input(port.name()) {
            return Err(GraphError::DuplicatePort {
                node: self.name.clone(),
                port: port.name().to_string(),
            });
        }
        let reference = self.inputs[index].child_reference().cloned();
        let mut next = self.clone();
        next.inputs[index] = port.with_child_reference(reference);
        Ok(next)
    }

    /// Set the override literal of a port. On a network, setting a published
    /// port also sets the child port it stands in for.
    pub fn with_input_value(
        &self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Node, GraphError> {
        let value = value.into();
        let index = self.input_index(name)?;
        let mut next = self.clone();
        next.inputs[index] = next.inputs[index].clone().with_value(value.clone());
        if let Some(reference) = self.inputs[index].child_reference() {
            let child = self.require_child(&reference.node)?;
            let updated = child.with_input_value(&reference.port, value)?;
            next.replace_child_arc(Arc::new(updated));
        }
        Ok(next)
    }

    pub fn with_input_range(&self, name: &str, range: PortRange) -> Result<Node, GraphError> {
        let index = self.input_index(name)?;
        let mut next = self.clone();
        next.inputs[index] = next.inputs[index].clone().with_range(range);
        Ok(next)
    }

    pub(crate) fn input_index(&self, name: &str) -> Result<usize, GraphError> {
        self.inputs
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| GraphError::PortNotFound {
                node: self.name.clone(),
                port: name.to_string(),
            })
    }
}
