//! Configuration for dependency graph generation.
//!
//! Load order: `depgraph.toml` in the workspace → environment variables →
//! defaults. Command-line flags are applied on top by the caller.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::discovery::DEFAULT_REPORT_PATTERNS;
use crate::render::ImageFormat;

/// File name looked up in the workspace root
pub const CONFIG_FILE: &str = "depgraph.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keep dependencies pulled in by other dependencies.
    /// When false only modules the project declares itself are drawn.
    pub include_indirect: bool,
    /// Glob patterns, relative to the workspace, that may hold the report.
    pub report_patterns: Vec<String>,
    /// Run the layout tool after writing the DOT file.
    pub render: bool,
    /// Images produced per run.
    pub formats: Vec<ImageFormat>,
    /// Graphviz executable.
    pub dot_program: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_indirect: true,
            report_patterns: DEFAULT_REPORT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            render: true,
            formats: vec![ImageFormat::Svg, ImageFormat::Jpg],
            dot_program: "dot".to_string(),
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
/// Returns `false` when the variable is set but does not parse.
fn env_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    target: &mut T,
) -> bool {
    let Some(value) = lookup(var) else {
        return true;
    };
    match value.trim().parse() {
        Ok(parsed) => {
            *target = parsed;
            true
        }
        Err(_) => {
            tracing::warn!(var, value = %value, "ignoring unparseable environment override");
            false
        }
    }
}

impl Config {
    /// Load `depgraph.toml` from the workspace root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(workspace: &Path) -> Result<Self> {
        let config_path = workspace.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("invalid config in {}", config_path.display()))?
        } else {
            Self::default()
        };

        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DEPGRAPH_*` overrides
    ///
    /// Unparseable values keep the current setting and are logged at `warn`.
    /// Returns the names of the variables that were rejected.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
        let mut rejected = Vec::new();
        if !env_override(&lookup, "DEPGRAPH_INCLUDE_INDIRECT", &mut self.include_indirect) {
            rejected.push("DEPGRAPH_INCLUDE_INDIRECT");
        }
        if !env_override(&lookup, "DEPGRAPH_RENDER", &mut self.render) {
            rejected.push("DEPGRAPH_RENDER");
        }
        if !env_override(&lookup, "DEPGRAPH_DOT_PROGRAM", &mut self.dot_program) {
            rejected.push("DEPGRAPH_DOT_PROGRAM");
        }
        rejected
    }
}
