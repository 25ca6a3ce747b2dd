//! Evaluation pipeline for Plexus node networks.
//!
//! Rendering pulls values through the network: a node renders every upstream
//! node it depends on (once per render call), then invokes its function once
//! per argument tuple. The submodules keep the concerns apart:
//!
//! - [`node_context`] owns the result cache, scopes and published-port
//!   bindings, and exposes the render entry points.
//! - [`broadcast`] turns port sources into invocations: whole-list ports,
//!   cycling over streams of different lengths, and recursion over nested
//!   lists.
//!
//! Integration code should interact with [`NodeContext`] and
//! [`RenderOptions`].

use hashbrown::HashMap;
use plexus_api_core::Value;
use serde::{Deserialize, Serialize};

mod broadcast;
mod node_context;

pub use node_context::NodeContext;

#[cfg(test)]
mod tests;

/// Host-provided settings for a [`NodeContext`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Exposed to functions through the call context, `core/frame` returns it.
    pub frame: f64,
    /// Arbitrary values functions can read from the call context.
    pub data: HashMap<String, Value>,
    /// `path.port` keys replacing port literals.
    pub overrides: HashMap<String, Value>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            frame: 1.0,
            data: HashMap::new(),
            overrides: HashMap::new(),
        }
    }
}
