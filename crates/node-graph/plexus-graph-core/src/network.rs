//! Network operations: children, connections and published ports.
//!
//! All checks happen here, when the network is edited. A network that was
//! built through these methods never carries a dangling connection, a
//! duplicate publication or a connection cycle into the evaluator.

use std::sync::Arc;

use hashbrown::HashSet;

use crate::connection::Connection;
use crate::error::GraphError;
use crate::node::Node;
use crate::port::{ChildReference, Port};
use crate::topo::topo_order;
use crate::types::is_valid_name;

impl Node {
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().map(|c| c.as_ref())
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The connection feeding `node.port`, if any.
    pub fn connection_to(&self, node: &str, port: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.feeds(node, port))
    }

    pub fn is_connected(&self, node: &str, port: &str) -> bool {
        self.connection_to(node, port).is_some()
    }

    pub fn rendered_child_name(&self) -> Option<&str> {
        self.rendered_child.as_deref()
    }

    pub fn rendered_child(&self) -> Option<&Node> {
        self.rendered_child
            .as_deref()
            .and_then(|name| self.child(name))
    }

    /// Inputs that stand in for a child port.
    pub fn published_ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().filter(|p| p.is_published())
    }

    pub fn published_port(&self, name: &str) -> Option<&Port> {
        self.published_ports().find(|p| p.name() == name)
    }

    /// The published port exposing `child.port`, if any.
    pub fn publication_of(&self, child: &str, port: &str) -> Option<&Port> {
        self.published_ports()
            .find(|p| p.child_reference().is_some_and(|r| r.matches(child, port)))
    }

    pub fn is_published(&self, child: &str, port: &str) -> bool {
        self.publication_of(child, port).is_some()
    }

    /// First free name of the form `<stem><n>`. Counting starts at the
    /// trailing number of `prefix` (1 when it has none): `number` tries
    /// `number1`, `number2`, ..., while `number12` tries `number12`,
    /// `number13`, ...
    pub fn unique_child_name(&self, prefix: &str) -> String {
        let stem = prefix.trim_end_matches(|c: char| c.is_ascii_digit());
        let start = prefix[stem.len()..].parse::<u64>().unwrap_or(1);
        let stem = if stem.is_empty() { "node" } else { stem };
        (start..)
            .map(|i| format!("{stem}{i}"))
            .find(|candidate| !self.has_child(candidate))
            .unwrap_or_else(|| stem.to_string())
    }

    /// Add a child. A name already in use is replaced with a unique one.
    pub fn with_child_added(&self, child: Node) -> Result<Node, GraphError> {
        self.require_network()?;
        if !is_valid_name(child.name()) {
            return Err(GraphError::InvalidName {
                name: child.name().to_string(),
            });
        }
        let child = if self.has_child(child.name()) {
            let name = self.unique_child_name(child.name());
            child.with_name(name)
        } else {
            child
        };
        let mut next = self.clone();
        next.children.push(Arc::new(child));
        Ok(next)
    }

    /// Remove a child together with its connections and publications.
    pub fn with_child_removed(&self, name: &str) -> Result<Node, GraphError> {
        self.require_child(name)?;
        let mut next = self.clone();
        next.children.retain(|c| c.name() != name);
        next.connections.retain(|c| !c.touches(name));
        next.inputs.retain(|p| p.child_reference().map_or(true, |r| r.node != name));
        if next.rendered_child.as_deref() == Some(name) {
            next.rendered_child = None;
        }
        Ok(next)
    }

    /// Rename a child, rewiring connections, publications and the rendered
    /// child.
    pub fn with_child_renamed(&self, old: &str, new: &str) -> Result<Node, GraphError> {
        let child = self.require_child(old)?;
        if old == new {
            return Ok(self.clone());
        }
        if !is_valid_name(new) {
            return Err(GraphError::InvalidName {
                name: new.to_string(),
            });
        }
        if self.has_child(new) {
            return Err(GraphError::DuplicateChild {
                network: self.name.clone(),
                child: new.to_string(),
            });
        }
        let renamed = Arc::new(child.with_name(new));
        let mut next = self.clone();
        for slot in next.children.iter_mut() {
            if slot.name() == old {
                *slot = renamed.clone();
            }
        }
        for c in next.connections.iter_mut() {
            if c.output_node == old {
                c.output_node = new.to_string();
            }
            if c.input_node == old {
                c.input_node = new.to_string();
            }
        }
        for port in next.inputs.iter_mut() {
            let moved = match port.child_reference() {
                Some(r) if r.node == old => Some(ChildReference::new(new, r.port.as_str())),
                _ => None,
            };
            if let Some(reference) = moved {
                *port = port.clone().with_child_reference(Some(reference));
            }
        }
        if next.rendered_child.as_deref() == Some(old) {
            next.rendered_child = Some(new.to_string());
        }
        Ok(next)
    }

    /// Swap in a new version of a child with the same name. Connections and
    /// publications pointing at ports the replacement lacks are dropped.
    pub fn with_child_replaced(&self, name: &str, child: Node) -> Result<Node, GraphError> {
        self.require_child(name)?;
        if child.name() != name {
            return Err(GraphError::ChildNameMismatch {
                expected: name.to_string(),
                found: child.name().to_string(),
            });
        }
        let mut next = self.clone();
        next.connections
            .retain(|c| c.input_node != name || child.has_input(&c.input_port));
        next.inputs.retain(|p| match p.child_reference() {
            Some(r) if r.node == name => child.has_input(&r.port),
            _ => true,
        });
        next.replace_child_arc(Arc::new(child));
        Ok(next)
    }

    pub fn with_rendered_child(&self, name: &str) -> Result<Node, GraphError> {
        self.require_child(name)?;
        let mut next = self.clone();
        next.rendered_child = Some(name.to_string());
        Ok(next)
    }

    pub fn without_rendered_child(&self) -> Node {
        Node {
            rendered_child: None,
            ..self.clone()
        }
    }

    /// Wire `output` into `input.port`, replacing whatever fed that port.
    pub fn connect(&self, output: &str, input: &str, port: &str) -> Result<Node, GraphError> {
        self.require_child(output)?;
        let target = self.require_child(input)?;
        if !target.has_input(port) {
            return Err(GraphError::PortNotFound {
                node: input.to_string(),
                port: port.to_string(),
            });
        }
        if self.is_published(input, port) {
            return Err(GraphError::PortIsPublished {
                child: input.to_string(),
                port: port.to_string(),
            });
        }
        let mut next = self.clone();
        next.connections.retain(|c| !c.feeds(input, port));
        next.connections.push(Connection::new(output, input, port));
        topo_order(&next)?;
        Ok(next)
    }

    /// Remove the connection feeding `input.port`.
    pub fn disconnect(&self, input: &str, port: &str) -> Result<Node, GraphError> {
        self.require_network()?;
        if !self.is_connected(input, port) {
            return Err(GraphError::ConnectionNotFound {
                child: input.to_string(),
                port: port.to_string(),
            });
        }
        let mut next = self.clone();
        next.connections.retain(|c| !c.feeds(input, port));
        Ok(next)
    }

    /// Remove every connection from or to `name`.
    pub fn disconnect_node(&self, name: &str) -> Result<Node, GraphError> {
        self.require_child(name)?;
        let mut next = self.clone();
        next.connections.retain(|c| !c.touches(name));
        Ok(next)
    }

    /// Expose `child.port` on this network as `published_name`.
    ///
    /// The published port copies the child port's type, range and literal as
    /// its default. Until it is connected or given a value of its own, the
    /// child port keeps rendering its own literal. A connection feeding the
    /// child port is removed.
    pub fn publish(
        &self,
        child: &str,
        port: &str,
        published_name: &str,
    ) -> Result<Node, GraphError> {
        let target = self.require_child(child)?;
        let child_port = target.input(port).ok_or_else(|| GraphError::PortNotFound {
            node: child.to_string(),
            port: port.to_string(),
        })?;
        if self.is_published(child, port) {
            return Err(GraphError::AlreadyPublished {
                child: child.to_string(),
                port: port.to_string(),
            });
        }
        if self.has_input(published_name) {
            return Err(GraphError::PublishedNameTaken {
                network: self.name.clone(),
                name: published_name.to_string(),
            });
        }
        let published = child_port.published_as(published_name, child);
        let mut next = self.clone();
        next.connections.retain(|c| !c.feeds(child, port));
        next.inputs.push(published);
        Ok(next)
    }

    pub fn unpublish(&self, published_name: &str) -> Result<Node, GraphError> {
        if self.published_port(published_name).is_none() {
            return Err(GraphError::NotPublished {
                network: self.name.clone(),
                name: published_name.to_string(),
            });
        }
        self.with_input_removed(published_name)
    }

    /// Unpublish by the child port instead of the published name.
    pub fn unpublish_port(&self, child: &str, port: &str) -> Result<Node, GraphError> {
        let name = self
            .publication_of(child, port)
            .map(|p| p.name().to_string())
            .ok_or_else(|| GraphError::NotPublished {
                network: self.name.clone(),
                name: format!("{child}.{port}"),
            })?;
        self.with_input_removed(&name)
    }

    /// Check every structural invariant, recursively. Graphs built through the
    /// editing methods always pass; deserialized graphs may not.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut ports = HashSet::new();
        for port in &self.inputs {
            if !ports.insert(port.name()) {
                return Err(GraphError::DuplicatePort {
                    node: self.name.clone(),
                    port: port.name().to_string(),
                });
            }
        }
        if !self.network {
            return Ok(());
        }

        let mut names = HashSet::new();
        for child in self.children() {
            if !is_valid_name(child.name()) {
                return Err(GraphError::InvalidName {
                    name: child.name().to_string(),
                });
            }
            if !names.insert(child.name()) {
                return Err(GraphError::DuplicateChild {
                    network: self.name.clone(),
                    child: child.name().to_string(),
                });
            }
            child.validate()?;
        }

        let mut fed = HashSet::new();
        for c in &self.connections {
            let valid = self.has_child(&c.output_node)
                && self.child(&c.input_node).is_some_and(|n| n.has_input(&c.input_port));
            if !valid || !fed.insert((c.input_node.as_str(), c.input_port.as_str())) {
                return Err(GraphError::DanglingConnection {
                    network: self.name.clone(),
                    connection: c.to_string(),
                });
            }
        }

        let mut published = HashSet::new();
        for port in self.published_ports() {
            let Some(reference) = port.child_reference() else {
                continue;
            };
            let exists = self
                .child(&reference.node)
                .is_some_and(|n| n.has_input(&reference.port));
            if !exists {
                return Err(GraphError::DanglingPublication {
                    network: self.name.clone(),
                    name: port.name().to_string(),
                    child: reference.node.clone(),
                    port: reference.port.clone(),
                });
            }
            if !published.insert(reference) {
                return Err(GraphError::AlreadyPublished {
                    child: reference.node.clone(),
                    port: reference.port.clone(),
                });
            }
        }

        if let Some(name) = self.rendered_child_name() {
            self.require_child(name)?;
        }
        topo_order(self).map(|_| ())
    }

    pub(crate) fn require_network(&self) -> Result<(), GraphError> {
        if self.network {
            Ok(())
        } else {
            Err(GraphError::NotANetwork {
                node: self.name.clone(),
            })
        }
    }

    pub(crate) fn require_child(&self, name: &str) -> Result<&Node, GraphError> {
        self.require_network()?;
        self.child(name).ok_or_else(|| GraphError::ChildNotFound {
            network: self.name.clone(),
            child: name.to_string(),
        })
    }

    pub(crate) fn replace_child_arc(&mut self, child: Arc<Node>) {
        if let Some(slot) = self.children.iter_mut().find(|c| c.name() == child.name()) {
            *slot = child;
        }
    }
}
