//! Dependency Orderer
//!
//! Topologically sorts a [`ResolvedGraph`] so every producer precedes the
//! nodes that reference it. Nodes with no constraint between them keep their
//! registration order, which makes the output reproducible byte for byte.

use crate::config::SynthConfig;
use crate::cycle::find_cycle;
use crate::error::GraphError;
use crate::resolver::{ResolvedGraph, ResolvedNode};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Resolved nodes in dependency order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedGraph {
    pub(crate) config: SynthConfig,
    pub(crate) nodes: Vec<ResolvedNode>,
}

impl OrderedGraph {
    /// Configuration carried over from the graph
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Nodes, producers first
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[ResolvedNode] {
        &self.nodes
    }

    /// Logical names in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(ResolvedNode::name).collect()
    }

    /// Position of a node in the ordering
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name() == name)
    }
}

/// Order resolved nodes so producers come before consumers
///
/// Uses Kahn's algorithm with a min-heap on registration index as the
/// tie-break. Fails with [`GraphError::CyclicReference`] when no order exists.
pub fn order(resolved: ResolvedGraph) -> Result<OrderedGraph, GraphError> {
    let ResolvedGraph { config, nodes } = resolved;
    let count = nodes.len();

    // Edges run producer -> consumer; node weights are positions in `nodes`.
    let mut dag: DiGraph<usize, ()> = DiGraph::with_capacity(count, count);
    let indices: Vec<NodeIndex> = (0..count).map(|pos| dag.add_node(pos)).collect();
    let positions: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(pos, node)| (node.name(), pos))
        .collect();

    for (consumer, node) in nodes.iter().enumerate() {
        for dep in node.depends_on() {
            let producer = *positions
                .get(dep.as_str())
                .ok_or_else(|| GraphError::UnknownNode { name: dep.clone() })?;
            dag.update_edge(indices[producer], indices[consumer], ());
        }
    }

    let mut in_degree: Vec<usize> = indices
        .iter()
        .map(|&ix| dag.neighbors_directed(ix, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(pos, _)| Reverse(pos))
        .collect();

    let mut sequence = Vec::with_capacity(count);
    while let Some(Reverse(pos)) = ready.pop() {
        sequence.push(pos);
        for next in dag.neighbors_directed(indices[pos], Direction::Outgoing) {
            let consumer = dag[next];
            in_degree[consumer] -= 1;
            if in_degree[consumer] == 0 {
                ready.push(Reverse(consumer));
            }
        }
    }

    if sequence.len() < count {
        // Every leftover node still waits on a leftover producer, so a walk
        // along references from any of them ends in a cycle.
        let adjacency: Vec<Vec<usize>> = (0..count)
            .map(|consumer| {
                if in_degree[consumer] == 0 {
                    return Vec::new();
                }
                let mut producers: Vec<usize> = dag
                    .neighbors_directed(indices[consumer], Direction::Incoming)
                    .map(|ix| dag[ix])
                    .filter(|&producer| in_degree[producer] > 0)
                    .collect();
                producers.sort_unstable();
                producers
            })
            .collect();

        let cycle = find_cycle(&adjacency).unwrap_or_default();
        return Err(GraphError::CyclicReference {
            cycle_path: cycle
                .into_iter()
                .map(|pos| nodes[pos].name().to_owned())
                .collect(),
        });
    }

    tracing::debug!(stack = %config.stack_name, nodes = count, "ordered graph");

    let mut slots: Vec<Option<ResolvedNode>> = nodes.into_iter().map(Some).collect();
    let ordered = sequence
        .into_iter()
        .filter_map(|pos| slots[pos].take())
        .collect();

    Ok(OrderedGraph {
        config,
        nodes: ordered,
    })
}
