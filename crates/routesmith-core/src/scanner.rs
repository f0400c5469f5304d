//! Project tree scanning.
//!
//! Walks a project directory looking for JavaScript/TypeScript sources that
//! register HTTP routes and carry a sibling validation specification. A
//! source without a spec file is simply not under test and is skipped
//! without comment; only the pairing of source + spec makes a file eligible
//! for generation.

// Internal imports (std, crate)
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

// External imports (alphabetized)
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Extension of the sibling specification file, replacing the source's own.
pub const SPEC_EXTENSION: &str = "spec.json";

/// Source file extensions considered for scanning.
const SOURCE_EXTENSIONS: &[&str] = &["js", "ts"];

/// Textual signals that a file registers Express routes. A file matching
/// none of these is not considered an application source even if a spec
/// file sits next to it.
const ROUTE_MARKERS: &[&str] = &["express(", "app.get(", "app.post("];

/// Directory name pruned entirely from the walk.
const DEPENDENCY_DIR: &str = "node_modules";

/// A source file paired with its sibling validation specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Path to the route-registering source file
    pub source: PathBuf,
    /// Path to the sibling `.spec.json` file
    pub spec: PathBuf,
}

/// Scan a project tree for (source, spec) pairs eligible for generation.
///
/// `node_modules` directories are pruned and never descended into. Results
/// follow walkdir's deterministic traversal order.
pub fn scan(root: &Path) -> Result<Vec<FilePair>> {
    let mut pairs = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_dependency_dir(entry));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_source_extension(path) {
            continue;
        }

        // A missing sibling spec is a legitimate "not under test" state.
        let spec = path.with_extension(SPEC_EXTENSION);
        if !spec.exists() {
            debug!(source = %path.display(), "no sibling spec, skipping");
            continue;
        }

        let content = fs::read_to_string(path)?;
        if !registers_routes(&content) {
            debug!(source = %path.display(), "no route markers, skipping");
            continue;
        }

        pairs.push(FilePair {
            source: path.to_path_buf(),
            spec,
        });
    }

    Ok(pairs)
}

fn is_dependency_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == DEPENDENCY_DIR
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Inclusion heuristic: does this file look like it registers routes?
fn registers_routes(content: &str) -> bool {
    ROUTE_MARKERS.iter().any(|marker| content.contains(marker))
}
