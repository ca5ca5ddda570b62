//! Report discovery with gitignore-aware filtering
//!
//! Build workspaces keep the resolve report somewhere under their build
//! directory, under a name derived from the project coordinates. This module
//! walks the workspace, matches candidate files against glob patterns and
//! keeps the ones that are actually Ivy reports.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

/// Glob patterns used when the configuration names none
pub const DEFAULT_REPORT_PATTERNS: &[&str] = &["**/*.xml"];

/// How much of a candidate file is read to recognise a report
const SNIFF_LEN: u64 = 4096;

/// Find Ivy resolve reports in a workspace
///
/// # Arguments
/// * `root` - Workspace directory to search
/// * `patterns` - Glob patterns relative to `root` (e.g. `&["build/**/*.xml"]`)
///
/// # Returns
/// Sorted absolute paths of matching files whose document element is
/// `<ivy-report>`, excluding anything matched by .gitignore
///
/// # Example
/// ```no_run
/// use depgraph_core::discovery;
///
/// let reports = discovery::find_reports(std::path::Path::new("my_project"), &["**/*.xml"]);
/// println!("Found {} reports", reports.len());
/// ```
pub fn find_reports<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Vec<PathBuf> {
    // Canonicalize root upfront to ensure all returned paths are absolute
    let canonical_root = match root.canonicalize() {
        Ok(path) => path,
        Err(err) => {
            warn!(root = %root.display(), %err, "workspace cannot be searched");
            return Vec::new();
        }
    };

    let glob_matcher = match build_glob_matcher(patterns) {
        Ok(matcher) => matcher,
        Err(err) => {
            warn!(%err, "invalid report pattern");
            return Vec::new();
        }
    };

    let mut reports = Vec::new();
    for result in build_walker(&canonical_root) {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                // Keep walking; one unreadable directory should not hide the report
                warn!(%err, "error walking workspace");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Ok(rel_path) = entry.path().strip_prefix(&canonical_root) else {
            continue;
        };
        if glob_matcher.is_match(rel_path) && is_ivy_report(entry.path()) {
            debug!(path = %entry.path().display(), "found dependency report");
            reports.push(entry.into_path());
        }
    }

    reports.sort();
    reports
}

/// Find the first Ivy report in a workspace (see [`find_reports`])
pub fn find_report<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Option<PathBuf> {
    find_reports(root, patterns).into_iter().next()
}

/// Check whether a file starts like an Ivy report document
pub fn is_ivy_report(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut head = Vec::new();
    if file.take(SNIFF_LEN).read_to_end(&mut head).is_err() {
        return false;
    }
    String::from_utf8_lossy(&head).contains("<ivy-report")
}

/// Build a glob matcher from the provided patterns
fn build_glob_matcher<S: AsRef<str>>(patterns: &[S]) -> Result<globset::GlobSet, globset::Error> {
    use globset::GlobSetBuilder;

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(globset::Glob::new(pattern.as_ref())?);
    }
    builder.build()
}

/// Build a WalkBuilder with proper ignore configuration
fn build_walker(root: &Path) -> ignore::Walk {
    let mut builder = WalkBuilder::new(root);
    builder
        .git_ignore(true)
        .git_exclude(true)
        .hidden(false)
        .parents(true);

    // WalkBuilder only reads .gitignore inside git repositories unless told
    let gitignore_path = root.join(".gitignore");
    if gitignore_path.exists() {
        let _ = builder.add_ignore(gitignore_path);
    }

    builder.build()
}
