//! Registry for converters.

use crate::converter::{Converter, ConverterDecl};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Registry of available converters.
///
/// The registry is an ordered list of format-graph edges. Registration
/// order is significant: direct lookups and route tie-breaking both
/// prefer the earliest registered edge. It is built once at startup and
/// shared read-only (usually behind an `Arc`) for the rest of the run.
#[derive(Clone)]
pub struct Registry {
    /// Converter declarations indexed by ID.
    declarations: IndexMap<String, ConverterDecl>,
    /// Converter implementations indexed by ID.
    implementations: IndexMap<String, Arc<dyn Converter>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("declarations", &self.declarations.keys().collect::<Vec<_>>())
            .field("implementations", &self.implementations.len())
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            declarations: IndexMap::new(),
            implementations: IndexMap::new(),
        }
    }

    /// Register a converter declaration (without implementation).
    ///
    /// Useful for planning when the actual converter isn't available yet.
    pub fn register_decl(&mut self, decl: ConverterDecl) {
        self.declarations.insert(decl.id.clone(), decl);
    }

    /// Register a converter with its implementation.
    ///
    /// Re-registering an ID replaces the previous entry but keeps its
    /// position in the registration order.
    pub fn register(&mut self, converter: impl Converter + 'static) {
        let decl = converter.decl().clone();
        let id = decl.id.clone();
        self.declarations.insert(id.clone(), decl);
        self.implementations.insert(id, Arc::new(converter));
    }

    /// Get a converter declaration by ID.
    pub fn get_decl(&self, id: &str) -> Option<&ConverterDecl> {
        self.declarations.get(id)
    }

    /// Get a converter implementation by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Converter>> {
        self.implementations.get(id).cloned()
    }

    /// Iterate over all declarations in registration order.
    pub fn declarations(&self) -> impl Iterator<Item = &ConverterDecl> {
        self.declarations.values()
    }

    /// Find the first registered converter for exactly `from -> to`.
    pub fn find_direct(&self, from: &str, to: &str) -> Option<&ConverterDecl> {
        self.declarations().find(|decl| decl.connects(from, to))
    }

    /// Converters whose source format is `format`, in registration order.
    pub fn outgoing<'a>(&'a self, format: &'a str) -> impl Iterator<Item = &'a ConverterDecl> {
        self.declarations().filter(move |decl| decl.from == format)
    }

    /// Converters whose destination format is `format`, in registration order.
    pub fn incoming<'a>(&'a self, format: &'a str) -> impl Iterator<Item = &'a ConverterDecl> {
        self.declarations().filter(move |decl| decl.to == format)
    }

    /// Every format tag appearing on either side of an edge, first-seen order.
    pub fn formats(&self) -> IndexSet<&str> {
        let mut formats = IndexSet::new();
        for decl in self.declarations() {
            formats.insert(decl.from.as_str());
            formats.insert(decl.to.as_str());
        }
        formats
    }

    /// Check if a format appears anywhere in the graph.
    pub fn knows_format(&self, format: &str) -> bool {
        self.declarations()
            .any(|decl| decl.from == format || decl.to == format)
    }

    /// Check if a format is a storage sink.
    ///
    /// A format is a sink when any edge into it is flagged as one.
    pub fn is_sink(&self, format: &str) -> bool {
        self.incoming(format).any(|decl| decl.sink)
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
