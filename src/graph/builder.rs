//! Graph builder: scans a directory and builds the dependency graph.
//!
//! Walks every regular file under the root (symlinks to files included),
//! reads them in parallel, extracts their `require` declarations and
//! assembles the graph in a fixed order once all reads are done.

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::engine::DependencyGraph;
use super::path::relative_id;
use super::types::FileRequires;
use crate::error::{ReqcatError, Result};
use crate::parser::{extract_file, MalformedPolicy};

/// What to do when a file under the root cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorPolicy {
    /// Fail the whole scan.
    #[default]
    Abort,
    /// Leave the file out of the graph with a warning.
    Skip,
}

/// Knobs for a directory scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Include dot-files and dot-directories.
    pub include_hidden: bool,
    /// Honour `.gitignore`, `.ignore` and git exclude files.
    pub respect_ignore_files: bool,
    /// Files never treated as nodes (the artifact, the config file).
    pub exclude: Vec<PathBuf>,
    pub on_malformed: MalformedPolicy,
    pub on_read_error: ReadErrorPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
            respect_ignore_files: false,
            exclude: Vec::new(),
            on_malformed: MalformedPolicy::default(),
            on_read_error: ReadErrorPolicy::default(),
        }
    }
}

/// A built graph plus what the scan saw.
#[derive(Debug, Clone)]
pub struct Scan {
    pub graph: DependencyGraph,
    pub stats: ScanStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files that became graph nodes.
    pub files: usize,
    /// Declarations found across those files.
    pub declarations: usize,
    /// Files left out because they could not be read.
    pub skipped: usize,
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scanned {} files ({} requires, {} skipped)",
            self.files, self.declarations, self.skipped
        )
    }
}

/// Build a dependency graph from every file under `root` with default options.
pub fn build_graph(root: &Path) -> Result<DependencyGraph> {
    scan(root, &ScanOptions::default()).map(|scan| scan.graph)
}

/// Scan `root` and build the dependency graph.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Scan> {
    let root = fs::canonicalize(root).map_err(|e| ReqcatError::io(root, e))?;
    let exclude: Vec<PathBuf> = options
        .exclude
        .iter()
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect();

    info!(root = %root.display(), "scanning directory");

    let mut stats = ScanStats::default();
    let mut files = Vec::new();

    for entry in WalkBuilder::new(&root)
        .hidden(!options.include_hidden)
        .ignore(options.respect_ignore_files)
        .git_ignore(options.respect_ignore_files)
        .git_global(options.respect_ignore_files)
        .git_exclude(options.respect_ignore_files)
        .parents(options.respect_ignore_files)
        .follow_links(false)
        .build()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => match options.on_read_error {
                ReadErrorPolicy::Abort => return Err(e.into()),
                ReadErrorPolicy::Skip => {
                    warn!(error = %e, "skipping unreadable entry");
                    stats.skipped += 1;
                    continue;
                }
            },
        };
        if !is_regular_file(&entry) {
            continue;
        }
        if exclude.iter().any(|p| p == entry.path()) {
            debug!(file = %entry.path().display(), "excluded from scan");
            continue;
        }
        let id = match relative_id(&root, entry.path()) {
            Ok(id) => id,
            Err(e @ ReqcatError::NonUtf8Path { .. }) => match options.on_read_error {
                ReadErrorPolicy::Abort => return Err(e),
                ReadErrorPolicy::Skip => {
                    warn!(error = %e, "skipping file with non UTF-8 name");
                    stats.skipped += 1;
                    continue;
                }
            },
            Err(e) => return Err(e),
        };
        files.push((id, entry.into_path()));
    }

    files.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let results: Vec<Result<Option<FileRequires>>> = files
        .par_iter()
        .map(|(id, path)| read_file(id, path, options))
        .collect();

    let mut extractions = Vec::with_capacity(results.len());
    for result in results {
        match result? {
            Some(extraction) => {
                stats.declarations += extraction.declarations.len();
                extractions.push(extraction);
            }
            None => stats.skipped += 1,
        }
    }
    stats.files = extractions.len();

    let graph = DependencyGraph::from_extractions(extractions);
    info!(
        files = stats.files,
        requires = stats.declarations,
        skipped = stats.skipped,
        "scan complete"
    );

    Ok(Scan { graph, stats })
}

/// Regular files and symlinks to regular files. Linked directories are
/// never descended.
fn is_regular_file(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}

/// Read and extract one file. `Ok(None)` means skipped by policy.
fn read_file(id: &str, path: &Path, options: &ScanOptions) -> Result<Option<FileRequires>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => match options.on_read_error {
            ReadErrorPolicy::Abort => return Err(ReqcatError::io(path, e)),
            ReadErrorPolicy::Skip => {
                warn!(file = %id, error = %e, "skipping unreadable file");
                return Ok(None);
            }
        },
    };

    let source = String::from_utf8_lossy(&bytes);
    let extraction = extract_file(id, &source, options.on_malformed)?;
    debug!(
        file = %id,
        requires = extraction.declarations.len(),
        "extracted"
    );
    Ok(Some(extraction))
}
