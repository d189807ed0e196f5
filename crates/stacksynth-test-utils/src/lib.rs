//! Testing utilities for stacksynth workspace
//!
//! Shared test helpers, fixtures, and assertions.

#![allow(missing_docs)]

use stacksynth_core::{Graph, NodeSpec, OutputDocument, Reference, SynthConfig, Value};

/// `role` (kind `role`) plus `fn` (kind `function`) reading `role.arn`
pub fn role_and_function_graph() -> Graph {
    let mut graph = Graph::new(SynthConfig::default());
    let role = graph
        .register_spec(NodeSpec::new("role", "role").attr("name", "iam_for_lambda"))
        .unwrap();
    graph
        .register_spec(NodeSpec::new("fn", "function").attr("role", role.attr("arn")))
        .unwrap();
    graph
}

/// `a` references `b` and `b` references `a`
pub fn mutual_reference_graph() -> Graph {
    let mut graph = Graph::new(SynthConfig::default());
    graph
        .register_spec(NodeSpec::new("a", "role").attr("peer", Reference::new("b", "id")))
        .unwrap();
    graph
        .register_spec(NodeSpec::new("b", "role").attr("peer", Reference::new("a", "id")))
        .unwrap();
    graph
}

/// Graph of `count` nodes named `n0..` where each `(consumer, producer)` edge
/// with `producer < consumer` becomes a reference to the producer's `id`.
///
/// Edges with `producer >= consumer` or out of range are skipped, so the
/// result is always acyclic. Nodes are registered in reverse index order so
/// registration order and dependency order disagree.
pub fn graph_from_edges(count: usize, edges: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new(SynthConfig::default());
    for consumer in (0..count).rev() {
        let refs: Vec<Value> = edges
            .iter()
            .filter(|(c, p)| *c == consumer && *p < consumer)
            .map(|(_, p)| Reference::new(format!("n{p}"), "id").into())
            .collect();
        graph
            .register_spec(
                NodeSpec::new(format!("n{consumer}"), "test").attr("deps", Value::List(refs)),
            )
            .unwrap();
    }
    graph
}

/// Assert `producer` appears before `consumer` in the document
pub fn assert_precedes(doc: &OutputDocument, producer: &str, consumer: &str) {
    let p = doc
        .position(producer)
        .unwrap_or_else(|| panic!("missing record '{producer}'"));
    let c = doc
        .position(consumer)
        .unwrap_or_else(|| panic!("missing record '{consumer}'"));
    assert!(
        p < c,
        "expected '{producer}' (#{p}) before '{consumer}' (#{c})"
    );
}

/// Logical names in document order
pub fn record_names(doc: &OutputDocument) -> Vec<String> {
    doc.records().iter().map(|r| r.name.clone()).collect()
}
