//! Path sandbox: confines every tool to a single root directory.
//!
//! Containment is checked on resolved paths component by component, so
//! `..` segments, absolute overrides and symlinks pointing outside the root
//! are all rejected.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::error::ToolError;

/// Case-insensitive set of allowed file suffixes (stored without the dot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

/// Immutable sandbox configuration shared by every tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
    extensions: ExtensionSet,
}

impl Sandbox {
    /// Resolve `root` to an absolute, symlink-free directory.
    pub fn new(root: &Path, extensions: ExtensionSet) -> Result<Self, ToolError> {
        let root = root
            .canonicalize()
            .map_err(|_| ToolError::RootNotFound(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(ToolError::RootNotFound(root));
        }
        Ok(Self { root, extensions })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    /// Fail with `RootNotFound` if the root vanished after startup.
    pub fn ensure_root(&self) -> Result<(), ToolError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(ToolError::RootNotFound(self.root.clone()))
        }
    }

    /// Resolve `candidate` against the root and reject escapes.
    ///
    /// Relative candidates are joined onto the root, absolute ones are taken
    /// as-is. The existing part of the path is resolved by the filesystem, so
    /// `..` after a symlink steps out of the link target. The result must be
    /// the root or one of its descendants.
    pub fn resolve(&self, candidate: &str) -> Result<PathBuf, ToolError> {
        let candidate = Path::new(candidate);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };
        let resolved = resolve_on_disk(&joined);
        if !resolved.starts_with(&self.root) {
            return Err(ToolError::AccessDenied { path: resolved });
        }
        Ok(resolved)
    }
}

/// Lexically remove `.` and `..` without touching the filesystem.
///
/// `..` never climbs above the filesystem root.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            Component::CurDir => {}
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// Canonicalize the longest existing prefix of `path` and normalize the
/// missing tail lexically.
///
/// A `..` in the tail can lead back into existing directories, so a tail
/// containing one is resolved again after normalization.
fn resolve_on_disk(path: &Path) -> PathBuf {
    let components: Vec<Component<'_>> = path.components().collect();
    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        let Ok(canonical) = prefix.canonicalize() else {
            continue;
        };
        let tail = &components[split..];
        if tail.is_empty() {
            return canonical;
        }
        let lexical = normalize_path(&tail.iter().fold(canonical, |acc, part| acc.join(part)));
        return if tail.contains(&Component::ParentDir) {
            resolve_on_disk(&lexical)
        } else {
            lexical
        };
    }
    normalize_path(path)
}
