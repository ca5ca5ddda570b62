//! Pruning indirect dependencies from a graph

use crate::graph::{DependencyGraph, Directness};

/// Keep the whole graph, or only what the root project declares itself
///
/// With `include_indirect` the graph is returned untouched. Otherwise the
/// result holds the root, the callees of `Direct` edges and those edges only;
/// modules reached solely through other modules are dropped.
pub fn filter(graph: DependencyGraph, include_indirect: bool) -> DependencyGraph {
    if include_indirect {
        return graph;
    }

    let mut direct = DependencyGraph::new(graph.root().clone());
    let root = direct.root_index();

    // Direct edges always leave the root
    for (_, callee, directness) in graph.edges() {
        if directness != Directness::Direct {
            continue;
        }
        let callee_index = direct.add_dependency(callee.clone());
        direct.add_edge(root, callee_index);
    }

    tracing::debug!(
        kept = direct.dependency_count(),
        dropped = graph.dependency_count() - direct.dependency_count(),
        "pruned indirect dependencies"
    );

    direct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModuleId;

    fn module(name: &str) -> ModuleId {
        ModuleId::new("org.example", name, "1.0")
    }

    /// root -> a, a -> b, root -> c
    fn sample_graph() -> DependencyGraph {
        let mut graph = DependencyGraph::new(module("app"));
        let root = graph.root_index();
        let a = graph.add_dependency(module("a"));
        let b = graph.add_dependency(module("b"));
        let c = graph.add_dependency(module("c"));
        graph.add_edge(root, a);
        graph.add_edge(a, b);
        graph.add_edge(root, c);
        graph
    }

    #[test]
    fn test_include_indirect_is_identity() {
        let graph = sample_graph();

        assert_eq!(filter(graph.clone(), true), graph);
    }

    #[test]
    fn test_direct_only_drops_transitive_modules() {
        let filtered = filter(sample_graph(), false);

        assert_eq!(filtered.node_count(), 3);
        assert_eq!(filtered.edge_count(), 2);
        assert!(filtered.contains_module(&module("a")));
        assert!(filtered.contains_module(&module("c")));
        assert!(!filtered.contains_module(&module("b")));
    }

    #[test]
    fn test_direct_only_keeps_only_direct_edges() {
        let filtered = filter(sample_graph(), false);

        assert!(filtered.edges().all(|(_, _, d)| d == Directness::Direct));
    }

    #[test]
    fn test_direct_only_never_adds_edges() {
        // root -> a, a -> b: b hangs off a non-root caller and must not move to the root
        let mut graph = DependencyGraph::new(module("app"));
        let root = graph.root_index();
        let a = graph.add_dependency(module("a"));
        let b = graph.add_dependency(module("b"));
        graph.add_edge(a, b);
        graph.add_edge(root, a);

        let filtered = filter(graph.clone(), false);

        assert_eq!(filtered.edge_count(), 1);
        assert!(!filtered.contains_module(&module("b")));
        for edge in filtered.edges() {
            assert!(graph.edges().any(|original| original == edge));
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter(sample_graph(), false);
        let twice = filter(once.clone(), false);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_direct_only_drops_modules_without_callers() {
        let mut graph = sample_graph();
        graph.add_dependency(module("orphan"));

        let filtered = filter(graph, false);

        assert!(!filtered.contains_module(&module("orphan")));
        assert_eq!(filtered.dependency_count(), 2);
    }
}
