//! Require-declaration extraction.
//!
//! A declaration is a line that starts with the exact marker `require '`
//! (case-sensitive, no leading whitespace). The target is everything after
//! the marker up to the closing quote at the end of the line.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ReqcatError, Result};
use crate::graph::path::normalize_declared;
use crate::graph::types::{Declaration, FileRequires};

/// The literal prefix that marks a declaration line.
pub const REQUIRE_MARKER: &str = "require '";

/// What to do with a `require '` line that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Fail the file (and the run).
    #[default]
    Error,
    /// Ignore the line with a warning.
    Skip,
}

/// Classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Not a declaration.
    Plain,
    /// A well-formed declaration with its raw target.
    Require(&'a str),
    /// Starts with the marker but has no closing quote or an empty target.
    Malformed,
}

/// Classify a single line (without its terminator).
pub fn parse_line(line: &str) -> Line<'_> {
    let Some(rest) = line.strip_prefix(REQUIRE_MARKER) else {
        return Line::Plain;
    };
    match rest.trim_end().strip_suffix('\'') {
        Some(target) if !target.is_empty() => Line::Require(target),
        _ => Line::Malformed,
    }
}

/// Extract declarations from the text of the file `id`.
pub fn extract_file(id: &str, source: &str, policy: MalformedPolicy) -> Result<FileRequires> {
    let mut declarations = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        match parse_line(line) {
            Line::Plain => {}
            Line::Require(target) => declarations.push(Declaration {
                target: normalize_declared(target),
                line: idx + 1,
            }),
            Line::Malformed => match policy {
                MalformedPolicy::Error => {
                    return Err(ReqcatError::MalformedDeclaration {
                        file: id.to_string(),
                        line: idx + 1,
                        text: line.to_string(),
                    })
                }
                MalformedPolicy::Skip => {
                    warn!(file = %id, line = idx + 1, text = %line, "skipping malformed require");
                }
            },
        }
    }

    Ok(FileRequires::new(id, declarations))
}

/// Declared targets of `source` in order, skipping malformed lines.
pub fn extract_dependencies(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| match parse_line(line) {
            Line::Require(target) => Some(normalize_declared(target)),
            _ => None,
        })
        .collect()
}
