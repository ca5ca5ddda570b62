//! Graph data structures for module dependency tracking
//!
//! Uses `petgraph::StableGraph` so node and edge indices keep their insertion
//! order. The serializer relies on that order to emit byte-identical text for
//! the same report.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Identity of a resolved module: organisation, name and revision
///
/// Two modules with the same name but a different revision are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    pub organisation: String,
    pub name: String,
    pub revision: String,
}

impl ModuleId {
    pub fn new(
        organisation: impl Into<String>,
        name: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            organisation: organisation.into(),
            name: name.into(),
            revision: revision.into(),
        }
    }

    /// Stable node label: `organisation:name:revision`
    pub fn label(&self) -> String {
        format!("{}:{}:{}", self.organisation, self.name, self.revision)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.organisation, self.name, self.revision)
    }
}

/// Whether a node is the project itself or one of its dependencies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// The project the report was resolved for
    Root,
    Dependency,
}

/// A node in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub module: ModuleId,
    pub node_type: NodeType,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.node_type == NodeType::Root
    }
}

/// How a dependency was reached
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Directness {
    /// Declared by the root project
    Direct,
    /// Pulled in by another dependency
    Indirect,
}

/// An edge from a caller module to the module it depends on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub directness: Directness,
}

/// The dependency graph of one resolve report
///
/// Always contains exactly one root node. Every module appears once, and a
/// `(caller, callee)` pair is connected by at most one edge.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying stable graph (private to enforce the invariants)
    inner: StableGraph<Node, Edge>,
    /// ModuleId to NodeIndex, so deduplication does not scan the node list
    node_map: HashMap<ModuleId, NodeIndex>,
    root: NodeIndex,
}

impl DependencyGraph {
    /// Create a graph holding only the root module
    pub fn new(root: ModuleId) -> Self {
        let mut inner = StableGraph::new();
        let root_index = inner.add_node(Node {
            module: root.clone(),
            node_type: NodeType::Root,
        });
        let mut node_map = HashMap::new();
        node_map.insert(root, root_index);

        Self {
            inner,
            node_map,
            root: root_index,
        }
    }

    /// The root module
    pub fn root(&self) -> &ModuleId {
        &self.inner[self.root].module
    }

    pub fn root_index(&self) -> NodeIndex {
        self.root
    }

    /// Add a dependency module, reusing the existing node if it is already present
    pub fn add_dependency(&mut self, module: ModuleId) -> NodeIndex {
        if let Some(&existing) = self.node_map.get(&module) {
            return existing;
        }
        let index = self.inner.add_node(Node {
            module: module.clone(),
            node_type: NodeType::Dependency,
        });
        self.node_map.insert(module, index);
        index
    }

    /// Connect `caller` to `callee`
    ///
    /// The edge is `Direct` exactly when `caller` is the root. Returns `None`
    /// when the pair is already connected; the first edge wins.
    pub fn add_edge(&mut self, caller: NodeIndex, callee: NodeIndex) -> Option<EdgeIndex> {
        if self.inner.find_edge(caller, callee).is_some() {
            return None;
        }
        let directness = if caller == self.root {
            Directness::Direct
        } else {
            Directness::Indirect
        };
        Some(self.inner.add_edge(caller, callee, Edge { directness }))
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Number of unique modules excluding the root
    pub fn dependency_count(&self) -> usize {
        self.node_count().saturating_sub(1)
    }

    /// Get a node by index
    pub fn node_weight(&self, index: NodeIndex) -> Option<&Node> {
        self.inner.node_weight(index)
    }

    /// Find the node for a module
    pub fn find_node(&self, module: &ModuleId) -> Option<NodeIndex> {
        self.node_map.get(module).copied()
    }

    pub fn contains_module(&self, module: &ModuleId) -> bool {
        self.node_map.contains_key(module)
    }

    /// Iterate over nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_weights()
    }

    /// Iterate over node indices in insertion order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.node_indices()
    }

    /// Iterate over edges in insertion order as `(caller, callee, directness)`
    pub fn edges(&self) -> impl Iterator<Item = (&ModuleId, &ModuleId, Directness)> {
        self.inner.edge_references().map(|e| {
            (
                &self.inner[e.source()].module,
                &self.inner[e.target()].module,
                e.weight().directness,
            )
        })
    }

    /// Outgoing edges of a node, ordered by insertion
    pub fn outgoing(&self, index: NodeIndex) -> Vec<(NodeIndex, Edge)> {
        let mut edges: Vec<_> = self
            .inner
            .edges(index)
            .map(|e| (e.id(), e.target(), *e.weight()))
            .collect();
        edges.sort_by_key(|(id, _, _)| id.index());
        edges
            .into_iter()
            .map(|(_, target, edge)| (target, edge))
            .collect()
    }

    /// Verify the root and module index agree with the stored nodes
    pub fn check_invariants(&self) -> Result<(), GraphError> {
        match self.inner.node_weight(self.root) {
            Some(node) if node.is_root() => {}
            _ => {
                return Err(GraphError::InvariantViolation(
                    "root node is missing".to_string(),
                ))
            }
        }

        for (module, &index) in &self.node_map {
            match self.inner.node_weight(index) {
                Some(node) if &node.module == module => {}
                _ => {
                    return Err(GraphError::InvariantViolation(format!(
                        "module {module} is indexed but has no node"
                    )))
                }
            }
        }

        for edge in self.inner.edge_references() {
            for endpoint in [edge.source(), edge.target()] {
                let known = self
                    .inner
                    .node_weight(endpoint)
                    .and_then(|node| self.node_map.get(&node.module))
                    .is_some_and(|&mapped| mapped == endpoint);
                if !known {
                    return Err(GraphError::InvariantViolation(format!(
                        "edge {} references node {} outside the module set",
                        edge.id().index(),
                        endpoint.index()
                    )));
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn remove_node_unchecked(&mut self, module: &ModuleId) {
        if let Some(&index) = self.node_map.get(module) {
            self.inner.remove_node(index);
        }
    }
}

impl PartialEq for DependencyGraph {
    /// Graphs are equal when they hold the same modules and the same edges
    fn eq(&self, other: &Self) -> bool {
        if self.root() != other.root()
            || self.node_count() != other.node_count()
            || self.edge_count() != other.edge_count()
        {
            return false;
        }
        let nodes: HashSet<_> = self.nodes().map(|n| (&n.module, n.node_type)).collect();
        let other_nodes: HashSet<_> = other.nodes().map(|n| (&n.module, n.node_type)).collect();
        let edges: HashSet<_> = self.edges().collect();
        let other_edges: HashSet<_> = other.edges().collect();
        nodes == other_nodes && edges == other_edges
    }
}

impl Eq for DependencyGraph {}
