//! Existence checks, concatenation and artifact writes.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ReqcatError, Result};
use crate::graph::path::resolve;

/// File operations against a scan root.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    root: PathBuf,
}

impl FileProcessor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `id` names an existing regular file under the root.
    pub fn exists(&self, id: &str) -> bool {
        resolve(&self.root, id).is_some_and(|path| path.is_file())
    }

    /// Ids that do not resolve to a regular file, sorted and deduplicated.
    pub fn missing<'a, I>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter()
            .filter(|id| !self.exists(id))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Fail with every missing id if any id does not resolve.
    pub fn validate_existence<'a, I>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let missing = self.missing(ids);
        if missing.is_empty() {
            Ok(())
        } else {
            debug!(count = missing.len(), "missing files");
            Err(ReqcatError::MissingDependency { missing })
        }
    }

    /// Concatenate files in exactly the given order.
    ///
    /// Each file contributes its id on a header line, its lines each
    /// terminated by `\n`, and one blank separator line.
    pub fn concatenate<S: AsRef<str>>(&self, order: &[S]) -> Result<String> {
        let mut content = String::new();
        for id in order {
            let id = id.as_ref();
            let path = resolve(&self.root, id).ok_or_else(|| ReqcatError::MissingDependency {
                missing: vec![id.to_string()],
            })?;
            let bytes = fs::read(&path).map_err(|e| ReqcatError::io(&path, e))?;

            content.push_str(id);
            content.push('\n');
            for line in String::from_utf8_lossy(&bytes).lines() {
                content.push_str(line);
                content.push('\n');
            }
            content.push('\n');
        }
        Ok(content)
    }

    /// Write `content` to `path` atomically.
    ///
    /// The text goes to a temporary file next to `path` which is renamed
    /// over it, so readers never see a partial artifact.
    pub fn persist(path: &Path, content: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| ReqcatError::io(parent, e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| ReqcatError::io(parent, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| ReqcatError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| ReqcatError::io(path, e.error))?;

        info!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, FileProcessor) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A"), "alpha\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/B"), "require 'A'\nbeta").unwrap();
        let processor = FileProcessor::new(dir.path());
        (dir, processor)
    }

    #[test]
    fn test_exists() {
        let (_dir, p) = fixture();
        assert!(p.exists("A"));
        assert!(p.exists("sub/B"));
        assert!(!p.exists("sub"));
        assert!(!p.exists("Z"));
        assert!(!p.exists("../A"));
    }

    #[test]
    fn test_validate_existence_lists_all_missing() {
        let (_dir, p) = fixture();
        let ids: Vec<String> = vec!["A".into(), "Z".into(), "sub/B".into(), "Y".into(), "Z".into()];
        assert_eq!(p.missing(&ids), vec!["Y", "Z"]);
        match p.validate_existence(&ids).unwrap_err() {
            ReqcatError::MissingDependency { missing } => assert_eq!(missing, vec!["Y", "Z"]),
            other => panic!("unexpected error: {other}"),
        }
        let present: Vec<String> = vec!["A".into(), "sub/B".into()];
        assert!(p.validate_existence(&present).is_ok());
    }

    #[test]
    fn test_concatenate_format_and_order() {
        let (_dir, p) = fixture();
        let out = p.concatenate(&["A", "sub/B"]).unwrap();
        assert_eq!(out, "A\nalpha\n\nsub/B\nrequire 'A'\nbeta\n\n");

        let reversed = p.concatenate(&["sub/B", "A"]).unwrap();
        assert!(reversed.starts_with("sub/B\n"));
    }

    #[test]
    fn test_concatenate_missing_file() {
        let (_dir, p) = fixture();
        assert!(p.concatenate(&["nope"]).is_err());
    }

    #[test]
    fn test_persist_overwrites_atomically() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out/result.txt");
        FileProcessor::persist(&target, "first").unwrap();
        FileProcessor::persist(&target, "second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");

        let leftovers = fs::read_dir(dir.path().join("out")).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
