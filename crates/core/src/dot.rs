//! DOT serialization of dependency graphs
//!
//! Output is deterministic: nodes and edges appear in the order a depth-first
//! walk from the root first reaches them, children visited in the order
//! their edges were added. Nodes the root cannot reach are walked afterwards
//! in insertion order. No styling is emitted; layout tools can add their own.

use std::collections::HashSet;
use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;
use serde::Serialize;

use crate::error::GraphError;
use crate::graph::DependencyGraph;

/// Name of the emitted `digraph`
pub const GRAPH_NAME: &str = "dependencies";

/// DOT text plus the number of dependencies it describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedGraph {
    pub text: String,
    /// Unique modules excluding the root
    pub dependency_count: usize,
}

/// Escape special characters for quoted DOT identifiers.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render a graph as DOT text
///
/// # Errors
/// Returns [`GraphError::InvariantViolation`] if the graph's module index and
/// node storage disagree.
pub fn serialize(graph: &DependencyGraph) -> Result<SerializedGraph, GraphError> {
    graph.check_invariants()?;

    let (nodes, edges) = depth_first_order(graph);
    let label = |index: NodeIndex| -> Result<String, GraphError> {
        graph
            .node_weight(index)
            .map(|node| escape_label(&node.module.label()))
            .ok_or_else(|| {
                GraphError::InvariantViolation(format!("node {} is missing", index.index()))
            })
    };

    let mut output = String::with_capacity(64 * (nodes.len() + edges.len()) + 32);
    let _ = writeln!(output, "digraph {GRAPH_NAME} {{");
    for &index in &nodes {
        let _ = writeln!(output, "  \"{}\";", label(index)?);
    }
    for &(from, to) in &edges {
        let _ = writeln!(output, "  \"{}\" -> \"{}\";", label(from)?, label(to)?);
    }
    output.push_str("}\n");

    Ok(SerializedGraph {
        text: output,
        dependency_count: graph.dependency_count(),
    })
}

/// Discovery order of nodes and edges for a walk starting at the root
fn depth_first_order(graph: &DependencyGraph) -> (Vec<NodeIndex>, Vec<(NodeIndex, NodeIndex)>) {
    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut nodes = Vec::with_capacity(graph.node_count());
    let mut edges = Vec::with_capacity(graph.edge_count());

    let starts = std::iter::once(graph.root_index()).chain(graph.node_indices());
    for start in starts {
        if !visited.insert(start) {
            continue;
        }
        nodes.push(start);

        let mut stack = vec![(start, graph.outgoing(start).into_iter())];
        while let Some((from, children)) = stack.last_mut() {
            let from = *from;
            match children.next() {
                Some((to, _)) => {
                    edges.push((from, to));
                    if visited.insert(to) {
                        nodes.push(to);
                        stack.push((to, graph.outgoing(to).into_iter()));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    (nodes, edges)
}
