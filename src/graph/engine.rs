//! The dependency graph engine.
//!
//! Holds the `require` relation between files and answers ordering
//! questions over it: cycle detection, topological order, and
//! per-file dependency queries.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use super::types::*;
use crate::error::{ReqcatError, Result};

/// Traversal state of a node during a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current walk stack.
    Active,
    /// Finished: the node and all its dependencies have been emitted.
    Done,
}

/// Immutable `require` graph over root-relative file ids.
///
/// Keys are the scanned files. Values are declared dependencies in source
/// order and may name files that were never scanned. Nodes are kept in a
/// `BTreeMap` so every traversal visits independent files in lexicographic
/// order and results are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    dependencies: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from per-file extractions.
    ///
    /// A later extraction for the same id replaces an earlier one.
    pub fn from_extractions(extractions: Vec<FileRequires>) -> Self {
        debug!(
            file_count = extractions.len(),
            "ingesting extractions into graph"
        );
        extractions
            .into_iter()
            .map(|file| {
                let targets = file.targets();
                (file.id, targets)
            })
            .collect()
    }

    // ─── Membership ─────────────────────────────────────────────

    /// Number of scanned files.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Whether `id` was scanned.
    pub fn contains(&self, id: &str) -> bool {
        self.dependencies.contains_key(id)
    }

    /// Scanned ids in lexicographic order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Every id mentioned anywhere: scanned files and everything they require.
    pub fn files(&self) -> BTreeSet<String> {
        self.dependencies
            .iter()
            .flat_map(|(id, deps)| std::iter::once(id).chain(deps))
            .cloned()
            .collect()
    }

    /// Ids that are required but were never scanned.
    pub fn unresolved(&self) -> BTreeSet<String> {
        self.dependencies
            .values()
            .flatten()
            .filter(|dep| !self.contains(dep))
            .cloned()
            .collect()
    }

    // ─── Queries ────────────────────────────────────────────────

    /// Declared dependencies of `id`, or `None` if it was not scanned.
    pub fn dependencies_of(&self, id: &str) -> Option<&[String]> {
        self.dependencies.get(id).map(Vec::as_slice)
    }

    /// Scanned files that directly require `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d == id))
            .map(|(file, _)| file.clone())
            .collect()
    }

    /// All scanned files reachable from `id`, dependencies first, `id` excluded.
    pub fn transitive_dependencies(&self, id: &str) -> Result<Vec<String>> {
        let (start, _) = self
            .dependencies
            .get_key_value(id)
            .ok_or_else(|| ReqcatError::UnknownNode { id: id.to_string() })?;

        let mut marks = HashMap::new();
        let mut order = Vec::new();
        self.postorder(start, &mut marks, &mut order)
            .map_err(|cycle| ReqcatError::CycleDetected { cycle })?;

        order.pop();
        Ok(order.into_iter().map(str::to_string).collect())
    }

    /// Direct, transitive and reverse dependencies of `id`.
    pub fn dependency_info(&self, id: &str) -> Result<DependencyInfo> {
        let transitive = self.transitive_dependencies(id)?;
        Ok(DependencyInfo {
            id: id.to_string(),
            direct: self.dependencies_of(id).unwrap_or_default().to_vec(),
            transitive,
            dependents: self.dependents_of(id),
        })
    }

    /// Summary counts.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            file_count: self.len(),
            referenced_count: self.files().len(),
            edge_count: self.dependencies.values().map(Vec::len).sum(),
            unresolved_count: self.unresolved().len(),
        }
    }

    // ─── Ordering ───────────────────────────────────────────────

    /// Find a dependency cycle among scanned files.
    ///
    /// Returns the exact path of the first cycle met, walking files in
    /// lexicographic order and dependencies in declaration order. Requires
    /// on unscanned ids cannot close a cycle and are ignored.
    pub fn detect_cycle(&self) -> Option<Cycle> {
        let mut marks = HashMap::new();
        let mut sink = Vec::new();
        for start in self.dependencies.keys() {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            if let Err(cycle) = self.postorder(start, &mut marks, &mut sink) {
                debug!(%cycle, "cycle found");
                return Some(cycle);
            }
        }
        None
    }

    /// Scanned files ordered so every file follows all files it requires.
    ///
    /// Independent files come out in lexicographic order of the walk roots;
    /// a file's own dependencies are visited in declaration order. Fails
    /// with [`ReqcatError::CycleDetected`] instead of looping on a cyclic graph.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut marks = HashMap::new();
        let mut order = Vec::with_capacity(self.len());
        for start in self.dependencies.keys() {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            self.postorder(start, &mut marks, &mut order)
                .map_err(|cycle| ReqcatError::CycleDetected { cycle })?;
        }
        Ok(order.into_iter().map(str::to_string).collect())
    }

    /// Every group of files that forms a cycle.
    ///
    /// Each group is a strongly connected component with more than one
    /// member, or a single self-requiring file. Members are sorted and the
    /// groups are sorted.
    pub fn cycle_groups(&self) -> Vec<Vec<String>> {
        let graph = self.to_petgraph();

        let mut groups: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| graph.find_edge(node, node).is_some())
            })
            .map(|component| {
                let mut ids: Vec<String> = component
                    .into_iter()
                    .map(|idx| graph[idx].to_string())
                    .collect();
                ids.sort_unstable();
                ids
            })
            .collect();

        groups.sort_unstable();
        groups
    }

    // ─── Internal Helpers ───────────────────────────────────────

    /// Iterative depth-first postorder from `start`.
    ///
    /// Appends each finished node to `out`. Nodes already `Done` in `marks`
    /// are not revisited, so repeated calls share work. On reaching an
    /// `Active` node the stack holds the cycle, which is returned.
    fn postorder<'a>(
        &'a self,
        start: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        out: &mut Vec<&'a str>,
    ) -> std::result::Result<(), Cycle> {
        let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::Active);

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let deps = self
                .dependencies
                .get(node)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let Some(dep) = deps.get(next) else {
                marks.insert(node, Mark::Done);
                out.push(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let dep = dep.as_str();
            if !self.contains(dep) {
                continue;
            }
            match marks.get(dep) {
                Some(Mark::Done) => {}
                Some(Mark::Active) => return Err(cycle_on_stack(&stack, dep)),
                None => {
                    marks.insert(dep, Mark::Active);
                    stack.push((dep, 0));
                }
            }
        }

        Ok(())
    }

    /// Petgraph view over scanned files; edges to unscanned ids are dropped.
    fn to_petgraph(&self) -> DiGraph<&str, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), 0);
        let index: HashMap<&str, NodeIndex> = self
            .nodes()
            .map(|id| (id, graph.add_node(id)))
            .collect();

        for (id, deps) in &self.dependencies {
            let from = index[id.as_str()];
            for dep in deps {
                if let Some(&to) = index.get(dep.as_str()) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        graph
    }
}

impl FromIterator<(String, Vec<String>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            dependencies: iter.into_iter().collect(),
        }
    }
}

/// The closed path from `reentered` to the top of `stack` and back.
fn cycle_on_stack(stack: &[(&str, usize)], reentered: &str) -> Cycle {
    let start = stack
        .iter()
        .position(|&(node, _)| node == reentered)
        .unwrap_or_default();
    let mut path: Vec<String> = stack[start..]
        .iter()
        .map(|&(node, _)| node.to_string())
        .collect();
    path.push(reentered.to_string());
    Cycle::new(path)
}
