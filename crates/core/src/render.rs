//! Turning DOT files into images with an external layout tool
//!
//! The [`Renderer`] trait is the only thing the rest of the crate knows
//! about rendering. [`GraphvizRenderer`] shells out to Graphviz `dot`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Image formats the renderer can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
    Jpg,
    Png,
    Pdf,
}

impl ImageFormat {
    /// File extension, also the Graphviz `-T` output type
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Pdf => "pdf",
        }
    }

    /// Image path for a DOT file: same stem, format extension
    pub fn output_path(self, dot_path: &Path) -> PathBuf {
        dot_path.with_extension(self.extension())
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "png" => Ok(ImageFormat::Png),
            "pdf" => Ok(ImageFormat::Pdf),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Errors from rendering DOT files
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status} while writing {format}: {stderr}")]
    Failed {
        program: String,
        format: ImageFormat,
        status: String,
        stderr: String,
    },
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Something that turns a DOT file into images
pub trait Renderer {
    /// Render `dot_path` once per format, returning the written image paths
    fn render(&self, dot_path: &Path, formats: &[ImageFormat]) -> Result<Vec<PathBuf>, RenderError>;
}

/// Renders through the Graphviz `dot` executable
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: PathBuf,
}

impl GraphvizRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, dot_path: &Path, formats: &[ImageFormat]) -> Result<Vec<PathBuf>, RenderError> {
        let program = self.program.display().to_string();
        let mut images = Vec::with_capacity(formats.len());

        for &format in formats {
            let image = format.output_path(dot_path);
            debug!(%program, %format, image = %image.display(), "rendering dependency graph");

            let output = Command::new(&self.program)
                .arg(format!("-T{}", format.extension()))
                .arg(dot_path)
                .arg("-o")
                .arg(&image)
                .output()
                .map_err(|source| RenderError::Spawn {
                    program: program.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(RenderError::Failed {
                    program: program.clone(),
                    format,
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
            images.push(image);
        }

        Ok(images)
    }
}
