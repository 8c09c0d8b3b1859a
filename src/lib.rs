//! # reqcat
//!
//! Concatenate a directory of text files in dependency order.
//!
//! Files declare what they need with lines of the form `require '<path>'`,
//! where `<path>` is relative to the scanned root. reqcat builds the
//! dependency graph over the whole tree, refuses cycles and missing files,
//! and writes every file once, after everything it requires.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reqcat::{bundle, Config};
//! use std::path::Path;
//!
//! let result = bundle(Path::new("docs"), &Config::default())?;
//! for file in &result.order {
//!     println!("{file}");
//! }
//! # Ok::<(), reqcat::ReqcatError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod processor;

// Re-exports for convenience
pub use config::Config;
pub use error::{ReqcatError, Result};

// Graph re-exports
pub use graph::{build_graph, Cycle, DependencyGraph, GraphStats, ScanOptions, ScanStats};
pub use parser::{extract_dependencies, MalformedPolicy};
pub use pipeline::{bundle, check, resolve, Bundle, CheckReport, Resolution};
pub use processor::FileProcessor;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_extract_then_order() {
        let graph: DependencyGraph = [
            ("app.txt", "require 'lib/b.txt'\nrequire 'lib/a.txt'\n"),
            ("lib/a.txt", "plain\n"),
            ("lib/b.txt", "require 'lib/a.txt'\n"),
        ]
        .into_iter()
        .map(|(id, text)| (id.to_string(), extract_dependencies(text)))
        .collect();

        assert_eq!(graph.detect_cycle(), None);
        assert_eq!(
            graph.topological_order().unwrap(),
            vec!["lib/a.txt", "lib/b.txt", "app.txt"]
        );
    }

    #[test]
    fn test_build_graph_from_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "one/first.md", "# first\n");
        write(dir.path(), "two/second.md", "require 'one/first.md'\n# second\n");

        let graph = build_graph(dir.path()).unwrap();
        let stats = graph.stats();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.unresolved_count, 0);
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_style_require_matches_key() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/a.txt", "a\n");
        write(dir.path(), "main.txt", "require 'lib\\a.txt'\n");

        let out = dir.path().join("bundle.txt");
        let config = Config {
            output: out.clone(),
            ..Config::default()
        };
        let result = bundle(dir.path(), &config).unwrap();
        assert_eq!(result.order, vec!["lib/a.txt", "main.txt"]);
    }

    #[test]
    fn test_resolve_does_not_write() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tree/a", "");
        let config = Config {
            output: dir.path().join("never.txt"),
            ..Config::default()
        };
        let resolution = resolve(&dir.path().join("tree"), &config).unwrap();
        assert_eq!(resolution.order, vec!["a"]);
        assert!(!config.output.exists());
    }
}
