use std::fmt;

use serde::{Deserialize, Serialize};

/// A wire from one child's output to another child's input port, within a
/// single network.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub output_node: String,
    pub input_node: String,
    pub input_port: String,
}

impl Connection {
    pub fn new(
        output_node: impl Into<String>,
        input_node: impl Into<String>,
        input_port: impl Into<String>,
    ) -> Self {
        Connection {
            output_node: output_node.into(),
            input_node: input_node.into(),
            input_port: input_port.into(),
        }
    }

    /// True if `node` is on either end.
    pub fn touches(&self, node: &str) -> bool {
        self.output_node == node || self.input_node == node
    }

    pub fn feeds(&self, node: &str, port: &str) -> bool {
        self.input_node == node && self.input_port == port
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}.{}", self.output_node, self.input_node, self.input_port)
    }
}
