//! The evaluator and its per-render result cache.

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use plexus_api_core::{CallContext, FunctionRepository, Value};

use super::broadcast::{Broadcast, Slot, Source};
use super::RenderOptions;
use crate::error::{GraphError, RenderError};
use crate::node::Node;
use crate::port::ChildReference;
use crate::types::NodePath;

/// The network a node is rendered in, plus values bound onto its children's
/// published ports by the enclosing network node.
struct Scope<'a> {
    network: Option<&'a Node>,
    path: NodePath,
    bindings: Vec<(ChildReference, Source)>,
}

impl<'a> Scope<'a> {
    fn standalone() -> Self {
        Scope {
            network: None,
            path: NodePath::root(),
            bindings: Vec::new(),
        }
    }

    /// Top-level scope of `network`: published ports given a value of their
    /// own bind it. The others leave the child port's literal in place.
    fn top_level(network: &'a Node) -> Self {
        let bindings = network
            .published_ports()
            .filter(|port| port.has_override())
            .filter_map(|port| {
                port.child_reference()
                    .map(|r| (r.clone(), Source::Literal(port.value().clone())))
            })
            .collect();
        Scope {
            network: Some(network),
            path: NodePath::root(),
            bindings,
        }
    }

    fn binding(&self, node: &str, port: &str) -> Option<&Source> {
        self.bindings
            .iter()
            .find(|(r, _)| r.matches(node, port))
            .map(|(_, source)| source)
    }
}

/// Renders nodes, memoizing every node once per top-level call.
///
/// Each of [`render_node`](Self::render_node),
/// [`render_network`](Self::render_network) and
/// [`render_child`](Self::render_child) starts a new render call: the result
/// cache is cleared, then filled with every node the call touches, keyed by
/// [`NodePath`] relative to the rendered node's network.
pub struct NodeContext<'r> {
    repository: &'r FunctionRepository,
    call: CallContext,
    overrides: HashMap<String, Value>,
    results: IndexMap<NodePath, Value>,
    in_progress: HashSet<NodePath>,
}

impl<'r> NodeContext<'r> {
    pub fn new(repository: &'r FunctionRepository) -> Self {
        NodeContext {
            repository,
            call: CallContext::default(),
            overrides: HashMap::new(),
            results: IndexMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn with_options(repository: &'r FunctionRepository, options: RenderOptions) -> Self {
        let mut ctx = NodeContext::new(repository).with_frame(options.frame);
        for (key, value) in options.data {
            ctx.call.insert_data(key, value);
        }
        for (key, value) in options.overrides {
            ctx = ctx.with_override(&key, value);
        }
        ctx
    }

    pub fn with_frame(mut self, frame: f64) -> Self {
        self.call.set_frame(frame);
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.call.insert_data(key, value);
        self
    }

    /// Substitute the literal of `path.port` (e.g. `subnet1/number1.number`,
    /// relative to the rendered node's network) for every render.
    pub fn with_override(mut self, key: &str, value: Value) -> Self {
        self.overrides
            .insert(key.trim_start_matches('/').to_string(), value);
        self
    }

    pub fn frame(&self) -> f64 {
        self.call.frame()
    }

    pub fn set_frame(&mut self, frame: f64) {
        self.call.set_frame(frame);
    }

    pub fn call_context(&self) -> &CallContext {
        &self.call
    }

    /// Render `node` on its own. Every port uses its literal.
    pub fn render_node(&mut self, node: &Node) -> Result<Value, RenderError> {
        self.begin();
        let outcome = self.render_in(&Scope::standalone(), node);
        self.finish(outcome)
    }

    /// Render the rendered child of `network`.
    pub fn render_network(&mut self, network: &Node) -> Result<Value, RenderError> {
        network.require_network()?;
        let child = network
            .rendered_child()
            .ok_or_else(|| RenderError::NothingToRender {
                network: network.name().to_string(),
            })?;
        self.render_child(network, child)
    }

    /// Render `child` with the connections of `network` in effect.
    pub fn render_child(&mut self, network: &Node, child: &Node) -> Result<Value, RenderError> {
        network.require_child(child.name())?;
        self.begin();
        let outcome = self.render_in(&Scope::top_level(network), child);
        self.finish(outcome)
    }

    /// Value of `node` in the last render call, looked up by name at the top
    /// level of that call.
    pub fn results(&self, node: &Node) -> Option<&Value> {
        self.results.get(&NodePath::root().child(node.name()))
    }

    pub fn results_at(&self, path: &NodePath) -> Option<&Value> {
        self.results.get(path)
    }

    /// Every value rendered in the last call, in completion order.
    pub fn results_map(&self) -> &IndexMap<NodePath, Value> {
        &self.results
    }

    fn begin(&mut self) {
        self.results.clear();
        self.in_progress.clear();
    }

    fn finish(&mut self, outcome: Result<Value, RenderError>) -> Result<Value, RenderError> {
        if let Err(err) = &outcome {
            warn!("render aborted: {err}");
        }
        self.in_progress.clear();
        outcome
    }

    fn render_in(&mut self, scope: &Scope<'_>, node: &Node) -> Result<Value, RenderError> {
        let path = scope.path.child(node.name());
        if let Some(value) = self.results.get(&path) {
            debug!("{path}: cached");
            return Ok(value.clone());
        }
        if !self.in_progress.insert(path.clone()) {
            return Err(RenderError::Cycle { path });
        }
        debug!("{path}: rendering");
        let outcome = self.evaluate(scope, node, &path);
        self.in_progress.remove(&path);
        let value = outcome?;
        self.results.insert(path, value.clone());
        Ok(value)
    }

    fn evaluate(
        &mut self,
        scope: &Scope<'_>,
        node: &Node,
        path: &NodePath,
    ) -> Result<Value, RenderError> {
        if node.is_network() {
            let sources = self.gather_sources(scope, node, path)?;
            return self.render_subnetwork(node, path, sources);
        }

        let id = node
            .function()
            .ok_or_else(|| RenderError::MissingFunction { path: path.clone() })?;
        let function = self
            .repository
            .get(id)
            .map_err(|source| RenderError::Resolution {
                path: path.clone(),
                function: id.to_string(),
                source,
            })?;
        let expected = function.arguments().len();
        if expected != node.inputs().len() {
            return Err(RenderError::ArityMismatch {
                path: path.clone(),
                function: id.to_string(),
                expected,
                found: node.inputs().len(),
            });
        }

        let sources: Vec<Source> = self
            .gather_sources(scope, node, path)?
            .into_iter()
            .zip(node.inputs())
            .map(|(source, port)| {
                source.unwrap_or_else(|| Source::Literal(port.value().clone()))
            })
            .collect();
        let slots: Vec<Slot<'_>> = node
            .inputs()
            .iter()
            .zip(&sources)
            .map(|(port, source)| Slot::new(port, source))
            .collect();
        let broadcast = Broadcast::new(node, function.as_ref(), &self.call, path, id);
        let items = broadcast.map_values(&slots)?;
        trace!(
            "{path}: {} invocations of {id}, {} values",
            broadcast.invocations(),
            items.len()
        );
        Ok(Value::List(items))
    }

    /// Binding, then connection, then override, then literal. A port whose
    /// only source is its default yields `None`.
    fn gather_sources(
        &mut self,
        scope: &Scope<'_>,
        node: &Node,
        path: &NodePath,
    ) -> Result<Vec<Option<Source>>, RenderError> {
        let mut sources = Vec::with_capacity(node.inputs().len());
        for port in node.inputs() {
            if let Some(bound) = scope.binding(node.name(), port.name()) {
                sources.push(Some(bound.clone()));
                continue;
            }
            let connection = scope.network.and_then(|network| {
                network
                    .connection_to(node.name(), port.name())
                    .map(|c| (network, c))
            });
            if let Some((network, connection)) = connection {
                let upstream = network.child(&connection.output_node).ok_or_else(|| {
                    GraphError::DanglingConnection {
                        network: network.name().to_string(),
                        connection: connection.to_string(),
                    }
                })?;
                let value = self.render_in(scope, upstream)?;
                sources.push(Some(Source::Connected(value)));
                continue;
            }
            let literal = match self.overrides.get(&path.port_key(port.name())) {
                Some(value) => Some(value),
                None if port.has_override() => Some(port.value()),
                None => None,
            };
            sources.push(literal.map(|v| Source::Literal(v.clone())));
        }
        Ok(sources)
    }

    fn render_subnetwork(
        &mut self,
        network: &Node,
        path: &NodePath,
        sources: Vec<Option<Source>>,
    ) -> Result<Value, RenderError> {
        let Some(rendered) = network.rendered_child() else {
            debug!("{path}: network has no rendered child");
            return Ok(Value::List(Vec::new()));
        };
        let bindings = network
            .inputs()
            .iter()
            .zip(sources)
            .filter_map(|(port, source)| Some((port.child_reference()?.clone(), source?)))
            .collect();
        let inner = Scope {
            network: Some(network),
            path: path.clone(),
            bindings,
        };
        self.render_in(&inner, rendered)
    }
}
