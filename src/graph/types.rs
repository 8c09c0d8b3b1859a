//! Core types for the dependency graph.
//!
//! Defines the extraction records handed from the parser to the graph,
//! the cycle diagnostic, and the summary structures returned by queries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `require '<target>'` line found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// The declared node id, already normalized.
    pub target: String,
    /// Line number of the declaration (1-indexed).
    pub line: usize,
}

/// Everything extracted from a single scanned file.
/// This is an intermediate representation before being added to the graph.
#[derive(Debug, Clone)]
pub struct FileRequires {
    /// Root-relative node id of the file.
    pub id: String,
    /// Declarations in source order, duplicates kept.
    pub declarations: Vec<Declaration>,
}

impl FileRequires {
    pub fn new(id: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            id: id.into(),
            declarations,
        }
    }

    /// Declared targets in source order.
    pub fn targets(&self) -> Vec<String> {
        self.declarations.iter().map(|d| d.target.clone()).collect()
    }
}

/// An exact dependency cycle.
///
/// The path starts and ends with the same node: `a -> b -> a`.
/// A self-requiring file is `a -> a`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle {
    path: Vec<String>,
}

impl Cycle {
    pub fn new(path: Vec<String>) -> Self {
        Self { path }
    }

    /// The closed path, first node repeated at the end.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Distinct members of the cycle in traversal order.
    pub fn members(&self) -> &[String] {
        match self.path.len() {
            0 => &[],
            n => &self.path[..n - 1],
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.path.len() == 2 && self.path[0] == self.path[1]
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join(" -> "))
    }
}

/// Summary counts for a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Files that were scanned (graph keys).
    pub file_count: usize,
    /// Every id mentioned anywhere, scanned or not.
    pub referenced_count: usize,
    /// Total declarations, duplicates included.
    pub edge_count: usize,
    /// Ids declared as dependencies but never scanned.
    pub unresolved_count: usize,
}

/// Direct, transitive and reverse dependencies of a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub id: String,
    pub direct: Vec<String>,
    pub transitive: Vec<String>,
    pub dependents: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_members_drop_closing_node() {
        let cycle = Cycle::new(vec!["a".into(), "b".into(), "c".into(), "a".into()]);
        assert_eq!(cycle.members(), ["a", "b", "c"]);
        assert!(!cycle.is_self_loop());
    }

    #[test]
    fn test_self_loop() {
        let cycle = Cycle::new(vec!["a".into(), "a".into()]);
        assert!(cycle.is_self_loop());
        assert_eq!(cycle.members(), ["a"]);
        assert_eq!(cycle.to_string(), "a -> a");
    }

    #[test]
    fn test_cycle_serializes_as_path() {
        let cycle = Cycle::new(vec!["a".into(), "b".into(), "a".into()]);
        let json = serde_json::to_string(&cycle).unwrap();
        assert_eq!(json, r#"["a","b","a"]"#);
    }
}
