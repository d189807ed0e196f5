//! Declared nodes
//!
//! A [`Node`] is a single resource or data lookup. [`NodeSpec`] is the builder
//! callers fill in before handing it to the registry.

use crate::value::{AttrPath, AttributeMap, Reference, Value};
use indexmap::IndexSet;

/// A registered resource or data source
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) attributes: AttributeMap,
    pub(crate) computed: IndexSet<String>,
    pub(crate) index: usize,
}

impl Node {
    /// Logical name, unique within the graph
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind tag
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Declared attributes in insertion order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Attribute by name
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Computed attributes declared on this node (in addition to its kind's)
    #[inline]
    #[must_use]
    pub fn computed(&self) -> &IndexSet<String> {
        &self.computed
    }

    /// Registration order
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Every reference held by this node, in attribute order
    #[must_use]
    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = Vec::new();
        for value in self.attributes.values() {
            value.for_each_reference(&mut |r| refs.push(r));
        }
        refs
    }
}

/// Handle returned by registration
///
/// Cheap to clone; use [`NodeHandle::attr`] to point other nodes at this one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    name: String,
    index: usize,
}

impl NodeHandle {
    pub(crate) fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }

    /// Logical name of the registered node
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration order
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Reference to one of this node's attributes
    #[must_use]
    pub fn attr(&self, path: impl Into<AttrPath>) -> Reference {
        Reference::new(self.name.clone(), path)
    }
}

/// Builder for a node declaration
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) attributes: AttributeMap,
    pub(crate) computed: IndexSet<String>,
}

impl NodeSpec {
    /// Start a declaration
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            attributes: AttributeMap::new(),
            computed: IndexSet::new(),
        }
    }

    /// Set an attribute; a later call with the same key replaces the value
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace all attributes
    #[must_use]
    pub fn attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declare an attribute the engine fills in after creation
    #[must_use]
    pub fn computed(mut self, attr: impl Into<String>) -> Self {
        self.computed.insert(attr.into());
        self
    }

    /// Logical name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
