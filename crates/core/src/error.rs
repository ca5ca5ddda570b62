//! Error types for the report-to-graph transformation

/// Errors raised while turning a dependency report into graph text.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The report could not be read as an Ivy resolve report
    #[error("failed to parse dependency report: {0}")]
    Parse(String),
    /// A graph invariant was broken (edge endpoint missing, root absent)
    #[error("dependency graph invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<quick_xml::DeError> for GraphError {
    fn from(err: quick_xml::DeError) -> Self {
        GraphError::Parse(err.to_string())
    }
}
