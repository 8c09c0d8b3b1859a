//! Node id normalization.
//!
//! A node id is a file's path relative to the scan root with components
//! joined by `/`. Scanner keys and declared targets both pass through here
//! so that `require 'lib/a.txt'` matches the key produced for `<root>/lib/a.txt`
//! on every platform.

use std::path::{Component, Path, PathBuf};

use crate::error::{ReqcatError, Result};

/// Root-relative node id for a file discovered under `root`.
pub fn relative_id(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ReqcatError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| ReqcatError::NonUtf8Path {
                    path: path.to_path_buf(),
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(ReqcatError::OutsideRoot {
                    path: path.to_path_buf(),
                    root: root.to_path_buf(),
                })
            }
        }
    }

    Ok(parts.join("/"))
}

/// Separators accepted in declared ids. On Unix `\` is an ordinary file
/// name character, so it only separates where the scanner splits on it.
#[cfg(windows)]
const SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/'];

/// Canonical form of an id written inside a file.
///
/// Separators become `/`, empty and `.` segments are dropped. `..` and a
/// leading separator are kept as written: such ids never match a scanned
/// key and surface as missing.
pub fn normalize_declared(raw: &str) -> String {
    let joined = raw
        .split(SEPARATORS)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    if raw.starts_with(SEPARATORS) {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Filesystem location of `id` under `root`.
///
/// Returns `None` for ids that could escape the root.
pub fn resolve(root: &Path, id: &str) -> Option<PathBuf> {
    if id.is_empty() || id.starts_with('/') {
        return None;
    }
    let mut path = root.to_path_buf();
    for segment in id.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s => path.push(s),
        }
    }
    Some(path)
}
