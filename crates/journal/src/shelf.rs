//! Shelf store: changelist changes set aside as durable patches
//!
//! Each shelf is a metadata record in `shelves.json` plus a standalone patch
//! at `shelves/<id>.patch`. The standalone file is what unshelve and export
//! read; the inline `patch` text in the record serves previews.

use crate::patch;
use chrono::{DateTime, Utc};
use cl_core::paths;
use cl_core::store::{atomic_write, read_optional, remove_if_exists, Layout};
use cl_core::{Error, Result, Vcs};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Minimum length of an id prefix accepted by `resolve`.
const MIN_PREFIX_LEN: usize = 4;

/// A set of changes removed from the working tree and kept as a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelvedChange {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the shelf was created
    pub date: DateTime<Utc>,
    /// Files captured at shelve time (empty for imported patches)
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Combined unified diff of `files`
    pub patch: String,
}

impl ShelvedChange {
    fn new(name: &str, description: Option<String>, files: Vec<PathBuf>, patch: String) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.to_string(),
            description,
            date: Utc::now(),
            files,
            patch,
        }
    }
}

/// Persistent collection of shelved changes.
#[derive(Debug)]
pub struct ShelfStore {
    layout: Layout,
    shelves: Vec<ShelvedChange>,
}

impl ShelfStore {
    /// Loads `shelves.json`. Records whose patch file is missing are kept
    /// and reported.
    pub fn load(layout: &Layout) -> Result<Self> {
        let file = layout.shelves_file();
        let shelves: Vec<ShelvedChange> = match read_optional(&file)? {
            Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .map_err(|e| Error::json(format!("parsing {}", file.display()), e))?,
            _ => Vec::new(),
        };

        for shelf in &shelves {
            let patch_file = layout.shelf_patch_file(&shelf.id);
            if !patch_file.exists() {
                warn!(
                    "Patch file for shelf {} ({}) is missing: {}",
                    shelf.id,
                    shelf.name,
                    patch_file.display()
                );
            }
        }

        debug!("Loaded {} shelves", shelves.len());
        Ok(Self {
            layout: layout.clone(),
            shelves,
        })
    }

    /// Writes every record to `shelves.json`.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.shelves)
            .map_err(|e| Error::json("serializing shelves", e))?;
        atomic_write(&self.layout.shelves_file(), &json)
    }

    /// Shelves, oldest first.
    pub fn shelves(&self) -> &[ShelvedChange] {
        &self.shelves
    }

    pub fn get(&self, id: &str) -> Option<&ShelvedChange> {
        self.shelves.iter().find(|s| s.id == id)
    }

    /// Resolves a user reference: full id, unique id prefix, or exact name.
    ///
    /// Among shelves sharing a name the most recent wins.
    pub fn resolve(&self, reference: &str) -> Option<&ShelvedChange> {
        if let Some(shelf) = self.get(reference) {
            return Some(shelf);
        }

        if reference.len() >= MIN_PREFIX_LEN {
            let upper = reference.to_uppercase();
            let mut matches = self.shelves.iter().filter(|s| s.id.starts_with(&upper));
            if let (Some(found), None) = (matches.next(), matches.next()) {
                return Some(found);
            }
        }

        self.shelves.iter().rev().find(|s| s.name == reference)
    }

    fn require(&self, id: &str) -> Result<&ShelvedChange> {
        self.get(id)
            .ok_or_else(|| Error::ShelfNotFound(id.to_string()))
    }

    /// Reads the standalone patch file of an existing shelf.
    fn read_patch_file(&self, id: &str) -> Result<String> {
        self.require(id)?;
        let path = self.layout.shelf_patch_file(id);
        read_optional(&path)?.ok_or(Error::PatchFileMissing {
            id: id.to_string(),
            path,
        })
    }

    /// Registers a record and its patch file together.
    fn record(&mut self, shelf: ShelvedChange) -> Result<ShelvedChange> {
        let patch_file = self.layout.shelf_patch_file(&shelf.id);
        atomic_write(&patch_file, shelf.patch.as_bytes())?;

        self.shelves.push(shelf.clone());
        if let Err(e) = self.save() {
            self.shelves.pop();
            if let Err(cleanup) = remove_if_exists(&patch_file) {
                warn!("Failed to remove orphaned patch file: {}", cleanup);
            }
            return Err(e);
        }
        Ok(shelf)
    }

    /// Captures the unstaged changes of `files` as a new shelf, then reverts them.
    ///
    /// Diffs are joined in input order. Files without changes are skipped; if
    /// none has changes, nothing is recorded. Revert failures are logged and
    /// do not undo the shelf.
    pub async fn shelve_changes(
        &mut self,
        vcs: &dyn Vcs,
        name: &str,
        files: &[PathBuf],
        description: Option<String>,
    ) -> Result<ShelvedChange> {
        let mut diffs = Vec::new();
        for file in files {
            let diff = vcs.diff(file, false).await?;
            if diff.trim().is_empty() {
                debug!("No unstaged changes in {}, skipping", file.display());
                continue;
            }
            diffs.push(diff.trim_end_matches('\n').to_string());
        }

        if diffs.is_empty() {
            return Err(Error::NothingToShelve);
        }

        let mut combined = diffs.join("\n");
        combined.push('\n');

        let shelf = self.record(ShelvedChange::new(
            name,
            description,
            files.to_vec(),
            combined,
        ))?;

        for file in files {
            if let Err(e) = vcs.revert_file(file).await {
                warn!("Failed to revert {} after shelving: {}", file.display(), e);
            }
        }

        info!(
            "Shelved {} files as {} ({})",
            files.len(),
            shelf.name,
            shelf.id
        );
        Ok(shelf)
    }

    /// Applies a shelf's patch to the working tree.
    ///
    /// The patch goes through a temporary file in the workspace root that is
    /// removed whether or not the apply succeeds. On failure the shelf is left
    /// untouched.
    pub async fn unshelve_changes(
        &mut self,
        vcs: &dyn Vcs,
        id: &str,
        remove_after_apply: bool,
    ) -> Result<()> {
        let content = self.read_patch_file(id)?;
        let root = self.layout.root();

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".cl-unshelve-{}-", id))
            .suffix(".patch")
            .tempfile_in(root)
            .map_err(|e| Error::io(format!("creating temp patch in {}", root.display()), e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| Error::io("writing temp patch", e))?;

        vcs.apply_patch_file(tmp.path()).await?;

        // The patch is applied; a leftover temp file must not fail the call
        if let Err(e) = tmp.close() {
            warn!("Failed to remove temp patch: {}", e);
        }

        info!("Applied shelf {}", id);

        if remove_after_apply {
            self.delete_shelved_change(id)?;
        }
        Ok(())
    }

    /// Deletes a shelf record and its patch file. False if `id` is unknown.
    pub fn delete_shelved_change(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.shelves.iter().position(|s| s.id == id) else {
            return Ok(false);
        };

        remove_if_exists(&self.layout.shelf_patch_file(id))?;
        let removed = self.shelves.remove(index);
        self.save()?;
        info!("Deleted shelf {} ({})", removed.name, removed.id);
        Ok(true)
    }

    /// Inline patch text of a shelf, for previews.
    pub fn get_patch_content(&self, id: &str) -> Result<&str> {
        Ok(&self.require(id)?.patch)
    }

    /// Copies a shelf's patch file to `target`.
    pub fn export_shelf(&self, id: &str, target: &Path) -> Result<()> {
        let content = self.read_patch_file(id)?;
        atomic_write(target, content.as_bytes())?;
        info!("Exported shelf {} to {}", id, target.display());
        Ok(())
    }

    /// Registers an external patch file as a new shelf with no captured files.
    pub fn import_shelf(
        &mut self,
        source: &Path,
        name: &str,
        description: Option<String>,
    ) -> Result<ShelvedChange> {
        let content = std::fs::read_to_string(source)
            .map_err(|e| Error::io(format!("reading {}", source.display()), e))?;

        let shelf = self.record(ShelvedChange::new(name, description, Vec::new(), content))?;
        info!("Imported {} as shelf {}", source.display(), shelf.id);
        Ok(shelf)
    }

    /// Files a shelf touches: the captured list, or paths read from the patch.
    pub fn affected_files(&self, id: &str) -> Result<Vec<PathBuf>> {
        let shelf = self.require(id)?;
        if !shelf.files.is_empty() {
            return Ok(shelf.files.clone());
        }

        let root = self.layout.root();
        Ok(patch::affected_paths(&shelf.patch)
            .iter()
            .map(|rel| paths::resolve(root, rel))
            .collect())
    }
}
