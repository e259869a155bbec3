//! Shared utilities for CLI commands

use anyhow::{anyhow, Context, Result};
use crate::locks::WorkspaceLock;
use chrono::{DateTime, Local, Utc};
use cl_core::{paths, Layout};
use git::GitCli;
use journal::{Changelist, ChangelistStore, ShelfStore, ShelvedChange, Workspace};
use std::path::{Path, PathBuf};

/// Find the workspace by walking up from cwd to find .cl/
pub fn find_workspace() -> Result<Layout> {
    let current = std::env::current_dir().context("Failed to get current directory")?;
    Layout::discover(&current)
        .map_err(|_| anyhow!("Not a changelist workspace (no .cl directory found). Run 'cl init' first."))
}

/// Open the workspace containing cwd, backed by git.
pub fn open_workspace() -> Result<Workspace> {
    let layout = find_workspace()?;
    open_at(&layout)
}

/// Take the workspace lock, then open the workspace.
///
/// Used by every command that writes changelist or shelf state. The lock
/// is taken before the stores load so repairs on load are serialized too.
pub fn lock_and_open() -> Result<(WorkspaceLock, Workspace)> {
    let layout = find_workspace()?;
    let lock = WorkspaceLock::acquire(&layout.locks_dir())?;
    let workspace = open_at(&layout)?;
    Ok((lock, workspace))
}

fn open_at(layout: &Layout) -> Result<Workspace> {
    let vcs = GitCli::new(layout.root());
    Workspace::open(layout.root(), Box::new(vcs)).context("Failed to open workspace")
}

/// Resolve changelist reference to its id
/// Supports:
/// - Full id: "01HN8XYZ..."
/// - Short id prefix: "01HN8" (must be unique)
/// - Name: "Feature"
pub fn resolve_changelist<'a>(store: &'a ChangelistStore, reference: &str) -> Result<&'a Changelist> {
    store
        .resolve(reference)
        .ok_or_else(|| anyhow!("Unknown changelist: '{}'", reference))
}

/// Resolve shelf reference (id, id prefix, or name)
pub fn resolve_shelf<'a>(store: &'a ShelfStore, reference: &str) -> Result<&'a ShelvedChange> {
    store
        .resolve(reference)
        .ok_or_else(|| anyhow!("Unknown shelf: '{}'", reference))
}

/// Turn a command-line path into an absolute, normalized path.
pub fn absolute_path(arg: &Path) -> Result<PathBuf> {
    if arg.is_absolute() {
        return Ok(paths::normalize(arg));
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(paths::normalize(&cwd.join(arg)))
}

/// Path as shown to the user: relative to the workspace root when inside it.
pub fn display_path(root: &Path, path: &Path) -> String {
    match paths::relative_to(root, path) {
        Some(rel) if !rel.as_os_str().is_empty() => paths::to_slash(&rel),
        _ => path.display().to_string(),
    }
}

/// Changelist names must contain something besides whitespace.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Name must not be empty");
    }
    Ok(trimmed.to_string())
}

/// First characters of an id, for compact listings
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let seconds = (Utc::now() - ts).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format timestamp as local absolute time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
