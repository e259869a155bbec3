//! Path normalization utilities for consistent path comparison.
//!
//! Changelist membership is keyed by absolute paths coming from several
//! places (git status output joined onto the workspace root, CLI arguments,
//! persisted JSON). Two spellings of the same file must compare equal:
//! - `.` components and trailing separators are dropped
//! - `..` components are folded lexically (no filesystem access)
//! - `\` and `/` are treated the same when building comparison keys
//! - comparison keys are lowercased on case-insensitive platforms

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path without touching the filesystem.
///
/// ```ignore
/// normalize(Path::new("/repo/./src/../a.txt")) -> "/repo/a.txt"
/// normalize(Path::new("/repo/src/"))           -> "/repo/src"
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a prefix
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Builds the key used to decide whether two paths name the same file.
///
/// Uses `/` separators on every platform. macOS and Windows filesystems are
/// case-insensitive by default, so keys are lowercased there.
pub fn comparison_key(path: &Path) -> String {
    let slashed = to_slash(&normalize(path));
    apply_case_normalization(&slashed)
}

/// Returns true if `a` and `b` name the same file.
pub fn same_path(a: &Path, b: &Path) -> bool {
    comparison_key(a) == comparison_key(b)
}

/// Returns true if `child` equals `parent` or is nested inside it.
pub fn is_within(parent: &Path, child: &Path) -> bool {
    let parent_key = comparison_key(parent);
    let child_key = comparison_key(child);

    if parent_key == child_key {
        return true;
    }

    let prefix = if parent_key.ends_with('/') {
        parent_key
    } else {
        format!("{}/", parent_key)
    };
    child_key.starts_with(&prefix)
}

/// Resolves a VCS-relative path (always `/`-separated) against the workspace root.
pub fn resolve(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    normalize(&path)
}

/// Returns `path` relative to `root`, or `None` if it lies outside.
pub fn relative_to(root: &Path, path: &Path) -> Option<PathBuf> {
    let root = normalize(root);
    let path = normalize(path);
    path.strip_prefix(&root).ok().map(Path::to_path_buf)
}

/// Renders a path with `/` separators (what git expects in pathspecs).
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

/// Applies case normalization based on platform.
fn apply_case_normalization(path: &str) -> String {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        path.to_lowercase()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        path.to_string()
    }
}
