//! Building nodes from function signatures.

use plexus_api_core::repository::split_identifier;
use plexus_api_core::{Argument, Function, FunctionRepository, LookupError};

use crate::node::Node;
use crate::port::Port;

/// The port a node exposes for one declared argument.
pub fn port_for_argument(argument: &Argument) -> Port {
    Port::new(argument.name.as_str(), argument.value_type)
        .with_range(argument.range)
        .with_default(argument.default_value())
}

impl Node {
    /// A leaf node for `identifier`, named after the function, with one port
    /// per argument and the function's output type and range.
    pub fn for_function(
        repository: &FunctionRepository,
        identifier: &str,
    ) -> Result<Node, LookupError> {
        let function = repository.get(identifier)?;
        let (_, name) = split_identifier(identifier)?;
        Ok(node_from_signature(name, identifier, function.as_ref()))
    }
}

fn node_from_signature(name: &str, identifier: &str, function: &dyn Function) -> Node {
    let mut node = Node::new(name)
        .with_function(identifier)
        .with_output_type(function.output_type())
        .with_output_range(function.output_range());
    node.inputs = function.arguments().iter().map(port_for_argument).collect();
    node
}
