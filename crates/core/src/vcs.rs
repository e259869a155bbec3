//! VCS capability surface consumed by the changelist and shelf stores.
//!
//! The stores never run version control commands themselves. Everything they
//! need from the working tree goes through [`Vcs`], which keeps them testable
//! against an in-memory fake and lets the git collaborator live in its own crate.

use crate::paths;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A rename reported by the VCS (paths relative to the workspace root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Raw working tree status as reported by the VCS.
///
/// All paths are relative to the workspace root and `/`-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Tracked files with unstaged modifications
    pub modified: Vec<String>,
    /// Files with changes in the index
    pub staged: Vec<String>,
    /// Files unknown to the VCS (not ignored)
    pub untracked: Vec<String>,
    /// Tracked files removed from the working tree or the index
    pub deleted: Vec<String>,
    /// Renames recorded in the index
    pub renamed: Vec<Rename>,
}

impl StatusSnapshot {
    /// True if the working tree has no changes at all.
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
            && self.staged.is_empty()
            && self.untracked.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
    }

    /// Resolves every relative path against `root`.
    pub fn resolve(&self, root: &Path) -> WorkingTreeStatus {
        let abs = |list: &[String]| -> Vec<PathBuf> {
            list.iter().map(|rel| paths::resolve(root, rel)).collect()
        };

        WorkingTreeStatus {
            modified: abs(&self.modified),
            staged: abs(&self.staged),
            untracked: abs(&self.untracked),
            deleted: abs(&self.deleted),
            renamed: self
                .renamed
                .iter()
                .map(|r| (paths::resolve(root, &r.from), paths::resolve(root, &r.to)))
                .collect(),
        }
    }
}

/// Per-file classification used by display code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    Modified,
    Added,
    Untracked,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// One-letter code, git-porcelain style.
    pub fn code(&self) -> char {
        match self {
            FileStatus::Modified => 'M',
            FileStatus::Added => 'A',
            FileStatus::Untracked => '?',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        }
    }
}

/// Working tree status with absolute, normalized paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    pub modified: Vec<PathBuf>,
    pub staged: Vec<PathBuf>,
    pub untracked: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// (from, to)
    pub renamed: Vec<(PathBuf, PathBuf)>,
}

impl WorkingTreeStatus {
    /// Every path that currently carries a change worth tracking in a changelist.
    ///
    /// Staged paths and rename targets are included so that a file staged by
    /// auto-stage is not pruned on the next refresh. Rename sources are not:
    /// they no longer exist in the working tree. Order is stable, duplicates
    /// are removed.
    pub fn all_changed(&self) -> Vec<PathBuf> {
        let mut seen = ahash::AHashSet::new();
        let mut out = Vec::new();

        let candidates = self
            .modified
            .iter()
            .chain(&self.staged)
            .chain(&self.untracked)
            .chain(&self.deleted)
            .chain(self.renamed.iter().map(|(_, to)| to));

        for path in candidates {
            if seen.insert(paths::comparison_key(path)) {
                out.push(path.clone());
            }
        }
        out
    }

    /// Classifies every changed path. Later categories win over earlier ones
    /// (a staged-then-deleted file shows as deleted).
    pub fn classify(&self) -> HashMap<PathBuf, FileStatus> {
        let mut map = HashMap::new();
        for path in &self.staged {
            map.insert(path.clone(), FileStatus::Added);
        }
        for path in &self.modified {
            map.insert(path.clone(), FileStatus::Modified);
        }
        for (_, to) in &self.renamed {
            map.insert(to.clone(), FileStatus::Renamed);
        }
        for path in &self.untracked {
            map.insert(path.clone(), FileStatus::Untracked);
        }
        for path in &self.deleted {
            map.insert(path.clone(), FileStatus::Deleted);
        }
        map
    }
}

/// Capability surface of the version control collaborator.
///
/// Paths passed in are absolute; implementations translate them to whatever
/// the underlying tool expects.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Workspace root the collaborator operates on.
    fn root(&self) -> &Path;

    /// Current working tree status.
    async fn status(&self) -> Result<StatusSnapshot>;

    /// Unified diff for a single file. Empty string if it has no changes.
    async fn diff(&self, path: &Path, staged: bool) -> Result<String>;

    /// Adds the given paths to the index.
    async fn stage_files(&self, paths: &[PathBuf]) -> Result<()>;

    /// Discards working tree changes to a single file.
    async fn revert_file(&self, path: &Path) -> Result<()>;

    /// Discards working tree changes to several files.
    async fn revert_paths(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            self.revert_file(path).await?;
        }
        Ok(())
    }

    /// Applies a patch file to the working tree. Fails on conflicts or malformed input.
    async fn apply_patch_file(&self, patch: &Path) -> Result<()>;
}
