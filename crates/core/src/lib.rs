//! depgraph Core Library
//!
//! This library turns Ivy resolve reports into module dependency graphs,
//! classifies every dependency as direct or indirect, and serializes the
//! result as DOT text for an external layout tool.
//!
//! The pipeline is [`builder::build`] → [`filter::filter`] →
//! [`dot::serialize`]; [`transform`] runs all three.

pub mod builder;
pub mod config;
pub mod discovery;
pub mod dot;
pub mod error;
pub mod filter;
pub mod graph;
pub mod recorder;
pub mod render;
pub mod report;

// Re-export commonly used types
pub use config::Config;
pub use dot::SerializedGraph;
pub use error::GraphError;
pub use graph::{DependencyGraph, Directness, Edge, ModuleId, Node, NodeType};
pub use recorder::{transform, GraphArtifacts, RecordOptions, Recorder};
pub use render::{GraphvizRenderer, ImageFormat, RenderError, Renderer};
