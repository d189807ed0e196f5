//! Reference Resolver
//!
//! Turns every [`Reference`] in a [`Graph`] into either the concrete value it
//! points at or an opaque [`Placeholder`] for attributes the engine computes.
//! Resolution is purely structural: no cloud state is consulted.
//!
//! # Rules
//! - Missing target node or undeclared attribute: [`GraphError::UnresolvedReference`]
//! - Path through literals to a literal: the literal is substituted
//! - Path landing on (or inside) a computed attribute: placeholder
//! - Path landing on another reference: followed transitively
//! - Any node-level reference cycle, including a self-reference:
//!   [`GraphError::CyclicReference`]

use crate::config::SynthConfig;
use crate::cycle::post_order;
use crate::error::GraphError;
use crate::registry::Graph;
use crate::value::{AttrPath, Reference, Value};
use indexmap::{IndexMap, IndexSet};
use serde_json::Number;
use std::fmt::{self, Display, Formatter};

/// Symbolic stand-in for an attribute only known after the engine executes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    target: String,
    kind: String,
    path: AttrPath,
}

impl Placeholder {
    /// Create a placeholder for `target.path`
    pub fn new(
        target: impl Into<String>,
        kind: impl Into<String>,
        path: impl Into<AttrPath>,
    ) -> Self {
        Self {
            target: target.into(),
            kind: kind.into(),
            path: path.into(),
        }
    }

    /// Logical name of the node that will produce the value
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Kind of the producing node
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Attribute path on the producing node
    #[inline]
    #[must_use]
    pub fn path(&self) -> &AttrPath {
        &self.path
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.path)
    }
}

/// Attribute value with every reference substituted
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// Explicit null
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(Number),
    /// String literal
    String(String),
    /// Ordered list
    List(Vec<ResolvedValue>),
    /// Ordered map
    Map(IndexMap<String, ResolvedValue>),
    /// Engine-computed value
    Placeholder(Placeholder),
}

impl ResolvedValue {
    /// Placeholder, if this value is one
    #[must_use]
    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Self::Placeholder(p) => Some(p),
            _ => None,
        }
    }

    /// String literal contents, if any
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A node after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) index: usize,
    pub(crate) attributes: IndexMap<String, ResolvedValue>,
    pub(crate) depends_on: Vec<String>,
}

impl ResolvedNode {
    /// Logical name
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

    /// Registration order
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Resolved attributes in declaration order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, ResolvedValue> {
        &self.attributes
    }

    /// Nodes this one references directly, in first-reference order
    #[inline]
    #[must_use]
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Output of [`resolve`]: nodes in registration order plus their edges
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGraph {
    pub(crate) config: SynthConfig,
    pub(crate) nodes: Vec<ResolvedNode>,
}

impl ResolvedGraph {
    /// Configuration carried over from the graph
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Nodes in registration order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[ResolvedNode] {
        &self.nodes
    }

    /// Node by logical name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Resolve every reference in `graph`
///
/// Consumes the graph: a graph is resolved at most once per run. Nodes are
/// resolved producers first, so following a reference only reads values that
/// are already resolved.
pub fn resolve(graph: Graph) -> Result<ResolvedGraph, GraphError> {
    let dependencies = collect_dependencies(&graph)?;
    let adjacency: Vec<Vec<usize>> = dependencies
        .iter()
        .map(|deps| deps.iter().copied().collect())
        .collect();

    let sequence = match post_order(&adjacency) {
        Ok(sequence) => sequence,
        Err(cycle) => {
            return Err(GraphError::CyclicReference {
                cycle_path: names_at(&graph, &cycle)?,
            })
        }
    };

    let mut resolved: Vec<Option<IndexMap<String, ResolvedValue>>> = vec![None; graph.len()];
    for index in sequence {
        let node = graph.node_at(index).ok_or_else(|| missing_index(index))?;
        let resolver = Resolver {
            graph: &graph,
            resolved: &resolved,
        };
        let attributes = node
            .attributes()
            .iter()
            .map(|(key, value)| Ok((key.clone(), resolver.value(node.name(), value)?)))
            .collect::<Result<IndexMap<_, _>, GraphError>>()?;
        resolved[index] = Some(attributes);
    }

    let mut nodes = Vec::with_capacity(graph.len());
    for ((node, deps), attributes) in graph.iter().zip(&dependencies).zip(resolved) {
        let deps: Vec<usize> = deps.iter().copied().collect();
        nodes.push(ResolvedNode {
            name: node.name().to_owned(),
            kind: node.kind().to_owned(),
            index: node.index(),
            attributes: attributes.ok_or_else(|| missing_index(node.index()))?,
            depends_on: names_at(&graph, &deps)?,
        });
    }

    tracing::debug!(
        stack = %graph.config().stack_name,
        nodes = nodes.len(),
        edges = dependencies.iter().map(IndexSet::len).sum::<usize>(),
        "resolved graph"
    );

    Ok(ResolvedGraph {
        config: graph.config().clone(),
        nodes,
    })
}

/// Direct dependencies of each node by registration index
fn collect_dependencies(graph: &Graph) -> Result<Vec<IndexSet<usize>>, GraphError> {
    graph
        .iter()
        .map(|node| {
            let mut deps = IndexSet::new();
            for reference in node.references() {
                let target = graph
                    .lookup(reference.target())
                    .map_err(|_| GraphError::unresolved(node.name(), reference))?;
                deps.insert(target.index());
            }
            Ok(deps)
        })
        .collect()
}

fn names_at(graph: &Graph, indexes: &[usize]) -> Result<Vec<String>, GraphError> {
    indexes
        .iter()
        .map(|&index| {
            graph
                .node_at(index)
                .map(|n| n.name().to_owned())
                .ok_or_else(|| missing_index(index))
        })
        .collect()
}

fn missing_index(index: usize) -> GraphError {
    GraphError::UnknownNode {
        name: format!("#{index}"),
    }
}

struct Resolver<'g> {
    graph: &'g Graph,
    /// Resolved attributes by registration index; `None` until resolved
    resolved: &'g [Option<IndexMap<String, ResolvedValue>>],
}

impl Resolver<'_> {
    /// Resolve a value declared on node `owner`
    fn value(&self, owner: &str, value: &Value) -> Result<ResolvedValue, GraphError> {
        Ok(match value {
            Value::Null => ResolvedValue::Null,
            Value::Bool(b) => ResolvedValue::Bool(*b),
            Value::Number(n) => ResolvedValue::Number(n.clone()),
            Value::String(s) => ResolvedValue::String(s.clone()),
            Value::List(items) => ResolvedValue::List(
                items
                    .iter()
                    .map(|item| self.value(owner, item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => ResolvedValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.value(owner, v)?)))
                    .collect::<Result<_, GraphError>>()?,
            ),
            Value::Reference(reference) => self.follow(owner, reference)?,
        })
    }

    /// Follow a reference held by node `owner` into its target's resolved
    /// attributes
    fn follow(&self, owner: &str, reference: &Reference) -> Result<ResolvedValue, GraphError> {
        let unresolved = || GraphError::unresolved(owner, reference);

        let target = self
            .graph
            .lookup(reference.target())
            .map_err(|_| unresolved())?;
        let Some((head, rest)) = reference.path().segments().split_first() else {
            return Err(unresolved());
        };
        // Producers are resolved before their consumers.
        let attributes = self
            .resolved
            .get(target.index())
            .and_then(Option::as_ref)
            .ok_or_else(unresolved)?;

        let Some(mut current) = attributes.get(head) else {
            if self.graph.is_computed(target, head) {
                return Ok(ResolvedValue::Placeholder(Placeholder {
                    target: target.name().to_owned(),
                    kind: target.kind().to_owned(),
                    path: reference.path().clone(),
                }));
            }
            return Err(unresolved());
        };

        for (depth, segment) in rest.iter().enumerate() {
            current = match current {
                ResolvedValue::Map(entries) => entries.get(segment).ok_or_else(unresolved)?,
                ResolvedValue::List(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or_else(unresolved)?,
                ResolvedValue::Placeholder(p) => {
                    return Ok(ResolvedValue::Placeholder(Placeholder {
                        target: p.target.clone(),
                        kind: p.kind.clone(),
                        path: p.path.join(&rest[depth..]),
                    }));
                }
                ResolvedValue::Null
                | ResolvedValue::Bool(_)
                | ResolvedValue::Number(_)
                | ResolvedValue::String(_) => return Err(unresolved()),
            };
        }

        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeSpec;

    fn graph_with(specs: Vec<NodeSpec>) -> Graph {
        let mut graph = Graph::default();
        for spec in specs {
            graph.register_spec(spec).unwrap();
        }
        graph
    }

    #[test]
    fn computed_attribute_becomes_placeholder() {
        let graph = graph_with(vec![
            NodeSpec::new("role", "role").attr("name", "iam_for_lambda"),
            NodeSpec::new("fn", "function").attr("role", Reference::new("role", "arn")),
        ]);

        let resolved = resolve(graph).unwrap();
        let func = resolved.get("fn").unwrap();
        let placeholder = func.attributes()["role"].as_placeholder().unwrap();

        assert_eq!(placeholder.target(), "role");
        assert_eq!(placeholder.kind(), "role");
        assert_eq!(placeholder.path().to_string(), "arn");
        assert_eq!(func.depends_on(), ["role"]);
    }

    #[test]
    fn literal_attribute_is_substituted() {
        let graph = graph_with(vec![
            NodeSpec::new("fn", "function").attr("function_name", "dale_test_auto"),
            NodeSpec::new("url", "function-url")
                .attr("function_name", Reference::new("fn", "function_name")),
        ]);

        let resolved = resolve(graph).unwrap();
        assert_eq!(
            resolved.get("url").unwrap().attributes()["function_name"],
            ResolvedValue::String("dale_test_auto".into())
        );
    }

    #[test]
    fn nested_literal_path_is_walked() {
        let graph = graph_with(vec![
            NodeSpec::new("fn", "function").attr(
                "environment",
                Value::map([("variables", Value::map([("foo", "bar")]))]),
            ),
            NodeSpec::new("out", "output")
                .attr("value", Reference::new("fn", "environment.variables.foo")),
        ]);

        let resolved = resolve(graph).unwrap();
        assert_eq!(
            resolved.get("out").unwrap().attributes()["value"].as_str(),
            Some("bar")
        );
    }

    #[test]
    fn reference_chain_is_followed() {
        let graph = graph_with(vec![
            NodeSpec::new("role", "role"),
            NodeSpec::new("fn", "function").attr("role", Reference::new("role", "arn")),
            NodeSpec::new("out", "output").attr("value", Reference::new("fn", "role")),
        ]);

        let resolved = resolve(graph).unwrap();
        let p = resolved.get("out").unwrap().attributes()["value"]
            .as_placeholder()
            .cloned()
            .unwrap();
        assert_eq!(p.to_string(), "role.arn");
    }

    #[test]
    fn path_inside_computed_attribute_stays_symbolic() {
        let graph = graph_with(vec![
            NodeSpec::new("doc", "policy-document"),
            NodeSpec::new("out", "output").attr("value", Reference::new("doc", "json.Statement")),
        ]);

        let resolved = resolve(graph).unwrap();
        let p = resolved.get("out").unwrap().attributes()["value"]
            .as_placeholder()
            .cloned()
            .unwrap();
        assert_eq!(p.path().to_string(), "json.Statement");
    }

    #[test]
    fn missing_target_is_unresolved() {
        let graph = graph_with(vec![
            NodeSpec::new("fn", "function").attr("role", Reference::new("ghost", "arn")),
        ]);

        assert_eq!(
            resolve(graph).unwrap_err(),
            GraphError::unresolved("fn", &Reference::new("ghost", "arn"))
        );
    }

    #[test]
    fn undeclared_attribute_is_unresolved() {
        let graph = graph_with(vec![
            NodeSpec::new("role", "role").attr("name", "r"),
            NodeSpec::new("fn", "function").attr("role", Reference::new("role", "colour")),
        ]);

        assert_eq!(
            resolve(graph).unwrap_err(),
            GraphError::unresolved("fn", &Reference::new("role", "colour"))
        );
    }

    #[test]
    fn walking_past_a_scalar_is_unresolved() {
        let graph = graph_with(vec![
            NodeSpec::new("role", "role").attr("name", "r"),
            NodeSpec::new("fn", "function").attr("role", Reference::new("role", "name.first")),
        ]);

        assert!(matches!(
            resolve(graph),
            Err(GraphError::UnresolvedReference { .. })
        ));
    }

    fn list_graph(path: &str) -> Graph {
        graph_with(vec![
            NodeSpec::new("a", "output").attr("xs", Value::list(["p", "q"])),
            NodeSpec::new("b", "output").attr("value", Reference::new("a", path)),
        ])
    }

    #[test]
    fn list_element_is_selected_by_index() {
        let resolved = resolve(list_graph("xs.1")).unwrap();
        assert_eq!(
            resolved.get("b").unwrap().attributes()["value"].as_str(),
            Some("q")
        );
    }

    #[test]
    fn list_index_out_of_range_is_unresolved() {
        assert_eq!(
            resolve(list_graph("xs.5")).unwrap_err(),
            GraphError::unresolved("b", &Reference::new("a", "xs.5"))
        );
    }

    #[test]
    fn non_numeric_list_index_is_unresolved() {
        assert_eq!(
            resolve(list_graph("xs.first")).unwrap_err(),
            GraphError::unresolved("b", &Reference::new("a", "xs.first"))
        );
    }

    #[test]
    fn long_chain_registered_consumer_first() {
        let depth = 20_000;
        let mut specs: Vec<NodeSpec> = (0..depth)
            .map(|i| {
                NodeSpec::new(format!("n{i}"), "output")
                    .attr("x", Reference::new(format!("n{}", i + 1), "x"))
            })
            .collect();
        specs.push(NodeSpec::new(format!("n{depth}"), "output").attr("x", "end"));

        let resolved = resolve(graph_with(specs)).unwrap();
        assert_eq!(resolved.get("n0").unwrap().attributes()["x"].as_str(), Some("end"));
    }

    #[test]
    fn self_reference_is_cyclic() {
        let graph = graph_with(vec![NodeSpec::new("a", "role")
            .attr("name", "x")
            .attr("alias", Reference::new("a", "name"))]);

        assert_eq!(
            resolve(graph).unwrap_err(),
            GraphError::CyclicReference {
                cycle_path: vec!["a".into(), "a".into()]
            }
        );
    }

    #[test]
    fn mutual_reference_is_cyclic() {
        let graph = graph_with(vec![
            NodeSpec::new("a", "role").attr("peer", Reference::new("b", "id")),
            NodeSpec::new("b", "role").attr("peer", Reference::new("a", "id")),
        ]);

        assert_eq!(
            resolve(graph).unwrap_err(),
            GraphError::CyclicReference {
                cycle_path: vec!["a".into(), "b".into(), "a".into()]
            }
        );
    }
}
