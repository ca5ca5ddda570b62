//! Per-build recording of dependency graphs
//!
//! Ties the pure transformation to the filesystem: read the report, write the
//! DOT file next to it (or into an output directory), hand it to a
//! [`Renderer`] and report what was produced.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::dot::{self, SerializedGraph};
use crate::error::GraphError;
use crate::render::{ImageFormat, Renderer};
use crate::{builder, filter};

/// Build, prune and serialize a report without touching the filesystem
///
/// # Example
/// ```
/// let report = r#"<ivy-report>
///   <info organisation="com.acme" module="app" revision="1.0"/>
///   <dependencies/>
/// </ivy-report>"#;
///
/// let out = depgraph_core::transform(report, true).unwrap();
/// assert_eq!(out.dependency_count, 0);
/// ```
pub fn transform(report_text: &str, include_indirect: bool) -> Result<SerializedGraph, GraphError> {
    let graph = builder::build(report_text)?;
    let graph = filter::filter(graph, include_indirect);
    dot::serialize(&graph)
}

/// Artifact file stem for a build: `report_<number>`, or `report` without one
pub fn artifact_name(build_number: Option<&str>) -> String {
    match build_number.map(str::trim).filter(|n| !n.is_empty()) {
        Some(number) => format!("report_{number}"),
        None => "report".to_string(),
    }
}

/// Files produced for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphArtifacts {
    pub dot_path: PathBuf,
    pub images: Vec<PathBuf>,
    pub dependency_count: usize,
}

/// Settings for one recording
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub include_indirect: bool,
    /// Where artifacts go; the report's directory when unset
    pub output_dir: Option<PathBuf>,
    pub formats: Vec<ImageFormat>,
}

impl RecordOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            include_indirect: config.include_indirect,
            output_dir: None,
            formats: config.formats.clone(),
        }
    }
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Writes the dependency graph artifacts of a build
pub struct Recorder {
    options: RecordOptions,
}

impl Recorder {
    pub fn new(options: RecordOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    /// Turn `report_path` into `<artifact_name>.dot` plus rendered images
    ///
    /// Without a renderer only the DOT file is written.
    pub fn record(
        &self,
        report_path: &Path,
        artifact_name: &str,
        renderer: Option<&dyn Renderer>,
    ) -> Result<GraphArtifacts> {
        let report_text = std::fs::read_to_string(report_path)
            .with_context(|| format!("failed to read report {}", report_path.display()))?;

        let serialized = transform(&report_text, self.options.include_indirect)
            .with_context(|| format!("failed to graph report {}", report_path.display()))?;

        let output_dir = self.output_dir(report_path);
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;

        let dot_path = output_dir.join(format!("{artifact_name}.dot"));
        std::fs::write(&dot_path, &serialized.text)
            .with_context(|| format!("failed to write {}", dot_path.display()))?;
        info!(
            path = %dot_path.display(),
            dependencies = serialized.dependency_count,
            "wrote dependency graph"
        );

        let images = match renderer {
            Some(renderer) => renderer
                .render(&dot_path, &self.options.formats)
                .with_context(|| format!("failed to render {}", dot_path.display()))?,
            None => Vec::new(),
        };
        for image in &images {
            info!(path = %image.display(), "rendered dependency graph");
        }

        Ok(GraphArtifacts {
            dot_path,
            images,
            dependency_count: serialized.dependency_count,
        })
    }

    fn output_dir(&self, report_path: &Path) -> PathBuf {
        match &self.options.output_dir {
            Some(dir) => dir.clone(),
            None => report_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const REPORT: &str = r#"<ivy-report version="1.0">
  <info organisation="com.acme" module="app" revision="1.0"/>
  <dependencies>
    <module organisation="org" name="a">
      <revision name="1">
        <caller organisation="com.acme" name="app" callerrev="1.0"/>
      </revision>
    </module>
    <module organisation="org" name="b">
      <revision name="1">
        <caller organisation="org" name="a" callerrev="1"/>
      </revision>
    </module>
  </dependencies>
</ivy-report>"#;

    /// Records calls and writes empty image files
    #[derive(Default)]
    struct FakeRenderer {
        calls: RefCell<Vec<(PathBuf, Vec<ImageFormat>)>>,
    }

    impl Renderer for FakeRenderer {
        fn render(
            &self,
            dot_path: &Path,
            formats: &[ImageFormat],
        ) -> Result<Vec<PathBuf>, RenderError> {
            self.calls
                .borrow_mut()
                .push((dot_path.to_path_buf(), formats.to_vec()));
            Ok(formats
                .iter()
                .map(|f| {
                    let path = f.output_path(dot_path);
                    std::fs::write(&path, b"").unwrap();
                    path
                })
                .collect())
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _: &Path, _: &[ImageFormat]) -> Result<Vec<PathBuf>, RenderError> {
            Err(RenderError::UnsupportedFormat("gif".to_string()))
        }
    }

    fn write_report(dir: &Path) -> PathBuf {
        let path = dir.join("com.acme-app-default.xml");
        std::fs::write(&path, REPORT).unwrap();
        path
    }

    #[test]
    fn test_transform_counts() {
        assert_eq!(transform(REPORT, true).unwrap().dependency_count, 2);
        assert_eq!(transform(REPORT, false).unwrap().dependency_count, 1);
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name(Some("42")), "report_42");
        assert_eq!(artifact_name(Some("  ")), "report");
        assert_eq!(artifact_name(None), "report");
    }

    #[test]
    fn test_record_writes_dot_next_to_report() {
        let temp_dir = TempDir::new().unwrap();
        let report = write_report(temp_dir.path());
        let renderer = FakeRenderer::default();

        let artifacts = Recorder::new(RecordOptions::default())
            .record(&report, "report_7", Some(&renderer))
            .unwrap();

        assert_eq!(artifacts.dot_path, temp_dir.path().join("report_7.dot"));
        assert_eq!(artifacts.dependency_count, 2);
        assert_eq!(
            artifacts.images,
            vec![
                temp_dir.path().join("report_7.svg"),
                temp_dir.path().join("report_7.jpg")
            ]
        );

        let dot = std::fs::read_to_string(&artifacts.dot_path).unwrap();
        assert_eq!(dot, transform(REPORT, true).unwrap().text);

        let calls = renderer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, artifacts.dot_path);
    }

    #[test]
    fn test_record_direct_only_into_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let report = write_report(temp_dir.path());
        let out_dir = temp_dir.path().join("graphs");

        let options = RecordOptions {
            include_indirect: false,
            output_dir: Some(out_dir.clone()),
            formats: vec![ImageFormat::Png],
        };
        let artifacts = Recorder::new(options).record(&report, "report", None).unwrap();

        assert_eq!(artifacts.dot_path, out_dir.join("report.dot"));
        assert!(artifacts.images.is_empty());
        assert_eq!(artifacts.dependency_count, 1);
        assert!(!std::fs::read_to_string(&artifacts.dot_path)
            .unwrap()
            .contains("org:b:1"));
    }

    #[test]
    fn test_record_render_failure_keeps_dot() {
        let temp_dir = TempDir::new().unwrap();
        let report = write_report(temp_dir.path());

        let result = Recorder::new(RecordOptions::default()).record(
            &report,
            "report",
            Some(&FailingRenderer),
        );

        assert!(result.is_err());
        assert!(temp_dir.path().join("report.dot").exists());
    }

    #[test]
    fn test_record_bad_report_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join("broken.xml");
        std::fs::write(&report, "<ivy-report/>").unwrap();

        let err = Recorder::new(RecordOptions::default())
            .record(&report, "report", None)
            .unwrap_err();

        assert!(err.downcast_ref::<GraphError>().is_some());
        assert!(!temp_dir.path().join("report.dot").exists());
    }
}
