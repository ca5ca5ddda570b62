//! Building a [`DependencyGraph`] from an Ivy resolve report
//!
//! Every `<revision>` of every `<module>` becomes one node. Every `<caller>`
//! under a revision becomes an edge from the caller to that revision:
//! `Direct` when the caller is the project named in `<info>`, `Indirect`
//! otherwise.
//!
//! Nodes are deduplicated by [`ModuleId`](crate::graph::ModuleId). Edges are
//! deduplicated by `(caller, callee)`; the first edge seen for a pair is kept
//! and later duplicates are dropped without error.

use tracing::{debug, warn};

use crate::error::GraphError;
use crate::graph::DependencyGraph;
use crate::report::IvyReport;

/// Parse report text and build its dependency graph
///
/// # Errors
/// Returns [`GraphError::Parse`] when the text is not an Ivy report, when a
/// required attribute is missing, or when the `<dependencies>` collection is
/// absent. No partial graph is returned.
pub fn build(report_text: &str) -> Result<DependencyGraph, GraphError> {
    let report = IvyReport::from_xml(report_text)?;
    build_from_report(&report)
}

/// Build the dependency graph of an already parsed report
pub fn build_from_report(report: &IvyReport) -> Result<DependencyGraph, GraphError> {
    let dependencies = report.dependencies.as_ref().ok_or_else(|| {
        GraphError::Parse("report has no <dependencies> collection".to_string())
    })?;

    let mut graph = DependencyGraph::new(report.root_module());
    let root = graph.root_index();
    let mut duplicates = 0usize;

    for module in &dependencies.modules {
        for revision in &module.revisions {
            let callee = graph.add_dependency(module.module_id(revision));

            for caller in &revision.callers {
                let caller_index = if report.is_root_caller(caller) {
                    root
                } else {
                    // Callers missing from the module list still become nodes
                    graph.add_dependency(caller.module_id())
                };

                if graph.add_edge(caller_index, callee).is_none() {
                    duplicates += 1;
                    debug!(
                        caller = %caller.module_id(),
                        callee = %module.module_id(revision),
                        "duplicate caller entry ignored"
                    );
                }
            }
        }
    }

    if duplicates > 0 {
        warn!(duplicates, "report declared some caller/callee pairs more than once");
    }
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built dependency graph"
    );

    Ok(graph)
}
