//! End-to-end runs: scan, gate on cycles, order, gate on missing files,
//! concatenate and write.
//!
//! Every structural problem is found before anything is written, so a
//! failed run never leaves a partial artifact behind.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ReqcatError, Result};
use crate::graph::builder::{scan, ScanStats};
use crate::graph::{Cycle, DependencyGraph, GraphStats};
use crate::processor::FileProcessor;

/// A validated graph and its concatenation order.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub graph: DependencyGraph,
    pub order: Vec<String>,
    pub stats: ScanStats,
}

/// Result of a successful bundle run.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub order: Vec<String>,
    pub output: PathBuf,
    pub content: String,
}

/// Diagnostics for a tree, gathered without failing on structural problems.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub scan: ScanStats,
    pub graph: GraphStats,
    /// First cycle met, as an exact path.
    pub cycle: Option<Cycle>,
    /// Every group of files involved in a cycle.
    pub cycle_groups: Vec<Vec<String>>,
    /// Referenced ids that are not scanned files.
    pub missing: Vec<String>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.cycle.is_none() && self.missing.is_empty()
    }

    /// Exit code of the worst finding; cycles outrank missing files.
    pub fn exit_code(&self) -> i32 {
        if self.cycle.is_some() {
            2
        } else if !self.missing.is_empty() {
            3
        } else {
            0
        }
    }
}

/// Scan `root` and compute a validated concatenation order.
pub fn resolve(root: &Path, config: &Config) -> Result<Resolution> {
    let scan = scan(root, &config.scan_options())?;
    let graph = scan.graph;

    if let Some(cycle) = graph.detect_cycle() {
        warn!(%cycle, "dependency cycle");
        return Err(ReqcatError::CycleDetected { cycle });
    }

    let order = graph.topological_order()?;

    let missing = missing_files(&graph, &FileProcessor::new(root));
    if !missing.is_empty() {
        warn!(count = missing.len(), "missing dependencies");
        return Err(ReqcatError::MissingDependency { missing });
    }

    info!(files = order.len(), "order resolved");
    Ok(Resolution {
        graph,
        order,
        stats: scan.stats,
    })
}

/// Resolve, concatenate in order and write the artifact to `config.output`.
pub fn bundle(root: &Path, config: &Config) -> Result<Bundle> {
    let resolution = resolve(root, config)?;
    let processor = FileProcessor::new(root);

    let content = processor.concatenate(&resolution.order)?;
    FileProcessor::persist(&config.output, &content)?;

    Ok(Bundle {
        order: resolution.order,
        output: config.output.clone(),
        content,
    })
}

/// Gather cycle and missing-file diagnostics for `root`.
///
/// Only scan failures (I/O, malformed declarations) are errors here.
pub fn check(root: &Path, config: &Config) -> Result<CheckReport> {
    let scan = scan(root, &config.scan_options())?;
    let graph = &scan.graph;

    Ok(CheckReport {
        scan: scan.stats,
        graph: graph.stats(),
        cycle: graph.detect_cycle(),
        cycle_groups: graph.cycle_groups(),
        missing: missing_files(graph, &FileProcessor::new(root)),
    })
}

/// Referenced ids that are absent on disk or were never scanned.
fn missing_files(graph: &DependencyGraph, processor: &FileProcessor) -> Vec<String> {
    let mut missing: BTreeSet<String> = processor.missing(&graph.files()).into_iter().collect();
    missing.extend(graph.unresolved());
    missing.into_iter().collect()
}
