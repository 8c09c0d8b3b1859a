//! Dependency graph module, the core of reqcat.
//!
//! Provides node id normalization, the graph engine with cycle detection
//! and ordering, and the directory scanner that builds it.

pub mod builder;
pub mod engine;
pub mod path;
pub mod types;

pub use builder::{build_graph, scan, ReadErrorPolicy, Scan, ScanOptions, ScanStats};
pub use engine::DependencyGraph;
pub use types::{Cycle, Declaration, DependencyInfo, FileRequires, GraphStats};
