//! Node Registry
//!
//! [`Graph`] owns every declared node for one synthesis run, keyed by logical
//! name. Registration order is preserved and later used as the ordering
//! tie-break.

use crate::config::SynthConfig;
use crate::error::GraphError;
use crate::node::{Node, NodeHandle, NodeSpec};
use crate::value::AttributeMap;
use indexmap::IndexMap;

/// The declared resource graph of one synthesis run
///
/// Usage:
/// ```rust
/// use stacksynth_core::{Graph, SynthConfig, Value};
///
/// let mut graph = Graph::new(SynthConfig::default());
/// let role = graph
///     .register("role", "role", [("name".to_string(), Value::from("iam_for_lambda"))].into_iter().collect())
///     .unwrap();
/// let func = graph
///     .register("fn", "function", [("role".to_string(), Value::from(role.attr("arn")))].into_iter().collect())
///     .unwrap();
/// assert_eq!(graph.len(), 2);
/// assert_eq!(func.index(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    config: SynthConfig,
    nodes: IndexMap<String, Node>,
}

impl Graph {
    /// Create an empty graph
    #[must_use]
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            nodes: IndexMap::new(),
        }
    }

    /// Configuration this graph was created with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Number of registered nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a node from its parts
    ///
    /// Fails with [`GraphError::DuplicateName`] if `name` is taken, whatever
    /// the kind or attributes.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        attributes: AttributeMap,
    ) -> Result<NodeHandle, GraphError> {
        self.register_spec(NodeSpec::new(name, kind).attributes(attributes))
    }

    /// Register a node from a builder
    pub fn register_spec(&mut self, spec: NodeSpec) -> Result<NodeHandle, GraphError> {
        if self.nodes.contains_key(&spec.name) {
            return Err(GraphError::DuplicateName { name: spec.name });
        }

        let index = self.nodes.len();
        tracing::debug!(
            node = %spec.name,
            kind = %spec.kind,
            attributes = spec.attributes.len(),
            "registered node"
        );

        let handle = NodeHandle::new(spec.name.clone(), index);
        self.nodes.insert(
            spec.name.clone(),
            Node {
                name: spec.name,
                kind: spec.kind,
                attributes: spec.attributes,
                computed: spec.computed,
                index,
            },
        );
        Ok(handle)
    }

    /// Look up a node by logical name
    pub fn lookup(&self, name: &str) -> Result<&Node, GraphError> {
        self.nodes.get(name).ok_or_else(|| GraphError::UnknownNode {
            name: name.to_owned(),
        })
    }

    /// Whether a node with this name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Node by registration index
    #[inline]
    #[must_use]
    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    /// Nodes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Whether `attr` on `node` is filled in by the engine rather than declared
    #[must_use]
    pub fn is_computed(&self, node: &Node, attr: &str) -> bool {
        node.computed.contains(attr) || self.config.is_computed(&node.kind, attr)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}
