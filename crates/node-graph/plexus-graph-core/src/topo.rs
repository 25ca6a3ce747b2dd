use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::error::GraphError;
use crate::node::Node;

/// Order the children of `network` so every node comes after the nodes
/// feeding it. Fails with [`GraphError::CycleDetected`] naming the nodes
/// that could not be ordered.
///
/// Connections whose endpoints are not children are ignored here; they are
/// reported by [`Node::validate`].
pub fn topo_order(network: &Node) -> Result<Vec<String>, GraphError> {
    let mut indeg: HashMap<&str, usize> = HashMap::new();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();

    for child in network.children() {
        indeg.entry(child.name()).or_insert(0);
    }
    for c in network.connections() {
        if !indeg.contains_key(c.output_node.as_str())
            || !indeg.contains_key(c.input_node.as_str())
        {
            continue;
        }
        adj.entry(c.output_node.as_str())
            .or_default()
            .push(c.input_node.as_str());
        *indeg.entry(c.input_node.as_str()).or_default() += 1;
    }

    // Seed in child order so the result is deterministic.
    let mut q: VecDeque<&str> = network
        .children()
        .map(Node::name)
        .filter(|name| indeg.get(name) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(indeg.len());
    while let Some(u) = q.pop_front() {
        order.push(u.to_string());
        if let Some(vs) = adj.get(u) {
            for v in vs {
                if let Some(d) = indeg.get_mut(v) {
                    *d -= 1;
                    if *d == 0 {
                        q.push_back(*v);
                    }
                }
            }
        }
    }

    if order.len() != indeg.len() {
        let mut nodes: Vec<String> = indeg
            .iter()
            .filter(|(_, &d)| d > 0)
            .map(|(name, _)| name.to_string())
            .collect();
        nodes.sort();
        return Err(GraphError::CycleDetected {
            network: network.name().to_string(),
            nodes,
        });
    }
    Ok(order)
}
