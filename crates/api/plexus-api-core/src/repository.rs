//! Function libraries and the repository resolving `"namespace/name"` ids.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::function::{Function, NativeFunction};
use crate::{LookupError, PortRange, Value, ValueType};

/// Namespace of the library every repository carries.
pub const CORE_NAMESPACE: &str = "core";

/// A named group of functions.
#[derive(Clone)]
pub struct FunctionLibrary {
    namespace: String,
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionLibrary {
    pub fn new(namespace: impl Into<String>) -> Self {
        FunctionLibrary {
            namespace: namespace.into(),
            functions: HashMap::new(),
        }
    }

    /// Builder form of [`FunctionLibrary::register`].
    pub fn with_function<F: Function + 'static>(mut self, function: F) -> Self {
        self.register(function);
        self
    }

    /// Add a function, replacing any previous one with the same name.
    pub fn register<F: Function + 'static>(&mut self, function: F) {
        self.functions
            .insert(function.name().to_string(), Arc::new(function));
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn function(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name).cloned()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Function names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionLibrary")
            .field("namespace", &self.namespace)
            .field("functions", &self.names())
            .finish()
    }
}

/// The `core` library: `zero` and `frame`.
pub fn core_library() -> FunctionLibrary {
    FunctionLibrary::new(CORE_NAMESPACE)
        .with_function(
            NativeFunction::new("zero", vec![], |_, _| Ok(Value::Float(0.0)))
                .returns(ValueType::Float, PortRange::Single),
        )
        .with_function(
            NativeFunction::new("frame", vec![], |ctx, _| Ok(Value::Float(ctx.frame())))
                .returns(ValueType::Float, PortRange::Single),
        )
}

/// Split `"namespace/name"` into its two non-empty halves.
pub fn split_identifier(identifier: &str) -> Result<(&str, &str), LookupError> {
    match identifier.split_once('/') {
        Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((ns, name))
        }
        _ => Err(LookupError::MalformedIdentifier(identifier.to_string())),
    }
}

/// Registry of function libraries keyed by namespace.
#[derive(Clone, Debug)]
pub struct FunctionRepository {
    libraries: HashMap<String, FunctionLibrary>,
}

impl Default for FunctionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRepository {
    /// A repository holding only the core library.
    pub fn new() -> Self {
        let mut libraries = HashMap::new();
        libraries.insert(CORE_NAMESPACE.to_string(), core_library());
        FunctionRepository { libraries }
    }

    pub fn with_library(mut self, library: FunctionLibrary) -> Self {
        self.add_library(library);
        self
    }

    /// Add a library. A library with the same namespace is replaced, except
    /// that core functions missing from a replacement `core` stay available.
    pub fn add_library(&mut self, library: FunctionLibrary) {
        let namespace = library.namespace().to_string();
        if namespace == CORE_NAMESPACE {
            let mut merged = core_library();
            for (name, function) in library.functions {
                merged.functions.insert(name, function);
            }
            self.libraries.insert(namespace, merged);
        } else {
            self.libraries.insert(namespace, library);
        }
    }

    pub fn library(&self, namespace: &str) -> Option<&FunctionLibrary> {
        self.libraries.get(namespace)
    }

    /// Namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.libraries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve `"namespace/name"` to a function.
    pub fn get(&self, identifier: &str) -> Result<Arc<dyn Function>, LookupError> {
        let (namespace, name) = split_identifier(identifier)?;
        let library = self
            .libraries
            .get(namespace)
            .ok_or_else(|| LookupError::UnknownNamespace {
                namespace: namespace.to_string(),
                identifier: identifier.to_string(),
            })?;
        library
            .function(name)
            .ok_or_else(|| LookupError::UnknownFunction {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    pub fn has_function(&self, identifier: &str) -> bool {
        self.get(identifier).is_ok()
    }
}
