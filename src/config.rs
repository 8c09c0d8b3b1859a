//! Configuration loaded from `reqcat.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! root = "src"                  # directory to scan, relative to this file
//! output = "output.txt"         # artifact path, relative to the working dir
//! include_hidden = true
//! respect_ignore_files = false
//! on_malformed = "error"        # or "skip"
//! on_read_error = "abort"       # or "skip"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ReqcatError, Result};
use crate::graph::builder::{ReadErrorPolicy, ScanOptions};
use crate::parser::MalformedPolicy;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "reqcat.toml";

/// Artifact name used when the config does not set one.
pub const DEFAULT_OUTPUT: &str = "output.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub root: Option<PathBuf>,
    pub output: PathBuf,
    pub include_hidden: bool,
    pub respect_ignore_files: bool,
    pub on_malformed: MalformedPolicy,
    pub on_read_error: ReadErrorPolicy,
    /// File this config was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            include_hidden: true,
            respect_ignore_files: false,
            on_malformed: MalformedPolicy::default(),
            on_read_error: ReadErrorPolicy::default(),
            source: None,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    ///
    /// A relative `root` is taken relative to the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ReqcatError::io(path, e)),
        };
        let mut config = Self::parse(&text).map_err(|source| ReqcatError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(root) = config.root.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.root = Some(base.join(root));
        }
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Scan options for this config. The artifact and the config file
    /// itself are never treated as source files.
    pub fn scan_options(&self) -> ScanOptions {
        let exclude = std::iter::once(&self.output)
            .chain(self.source.as_ref())
            .cloned()
            .collect();
        ScanOptions {
            include_hidden: self.include_hidden,
            respect_ignore_files: self.respect_ignore_files,
            exclude,
            on_malformed: self.on_malformed,
            on_read_error: self.on_read_error,
        }
    }
}
