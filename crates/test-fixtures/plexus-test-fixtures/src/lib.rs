//! Shared fixtures for Plexus tests and benches: small function libraries and
//! JSON node graphs listed in `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub mod libraries;

pub use libraries::{repository, SideEffects};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "node-graphs")]
    node_graphs: HashMap<String, NodeGraphEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeGraphEntry {
    spec: String,
    #[serde(default)]
    expected: Option<serde_json::Value>,
    #[serde(default)]
    render: Option<String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod node_graphs {
    use plexus_api_core::json::parse_value;
    use plexus_api_core::Value;

    use super::*;

    /// Fixture names, sorted.
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.node_graphs.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn spec_json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        read_to_string(&entry.spec)
    }

    pub fn spec<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        super::load_json(&entry.spec)
    }

    pub fn spec_path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        Ok(resolve_path(&entry.spec))
    }

    /// Expected render result, written as shorthand value JSON.
    pub fn expected(name: &str) -> Result<Option<Value>> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        entry
            .expected
            .clone()
            .map(|raw| parse_value(raw).with_context(|| format!("bad expected value for '{name}'")))
            .transpose()
    }

    /// Child to render with `render_child`; `None` means `render_network`.
    pub fn render_target(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.node_graphs, "node graph", name)?;
        Ok(entry.render.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_resolve() {
        for key in node_graphs::keys() {
            let path = node_graphs::spec_path(&key).expect("listed fixture");
            assert!(path.exists(), "missing fixture file {}", path.display());
            node_graphs::spec::<serde_json::Value>(&key).expect("fixture parses as JSON");
            node_graphs::expected(&key).expect("expected value parses");
        }
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        let err = node_graphs::spec_json("does-not-exist").unwrap_err();
        assert!(err.to_string().contains("unknown node graph fixture"));
    }
}
