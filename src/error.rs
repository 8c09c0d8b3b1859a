//! Error types for reqcat.

use std::path::PathBuf;
use thiserror::Error;

use crate::graph::Cycle;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ReqcatError>;

#[derive(Debug, Error)]
pub enum ReqcatError {
    /// One or more referenced files do not exist under the root.
    #[error("missing dependencies: {}", missing.join(", "))]
    MissingDependency { missing: Vec<String> },

    /// The require relation is not a DAG.
    #[error("dependency cycle detected: {cycle}")]
    CycleDetected { cycle: Cycle },

    /// A `require '` line that does not close its quote or names nothing.
    #[error("malformed declaration in {file}:{line}: {text:?}")]
    MalformedDeclaration {
        file: String,
        line: usize,
        text: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not inside {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown file: {id}")]
    UnknownNode { id: String },
}

impl ReqcatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    ///
    /// Structural failures get distinct codes so scripts can tell a cycle
    /// from a missing file without parsing stderr.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CycleDetected { .. } => 2,
            Self::MissingDependency { .. } => 3,
            Self::MalformedDeclaration { .. } => 4,
            Self::Config { .. } => 5,
            _ => 1,
        }
    }
}
