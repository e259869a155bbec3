//! Changelist store: partition of changed paths into named groups
//!
//! Invariants maintained by every mutator:
//! - a path belongs to at most one changelist
//! - exactly one changelist is active
//! - the store is never empty
//!
//! Every membership change goes through one reassignment primitive, which
//! removes the path from all other changelists before adding it to the target.

use cl_core::paths;
use cl_core::store::{atomic_write, read_optional, Layout};
use cl_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Name of the changelist synthesized when the store is empty.
pub const DEFAULT_CHANGELIST_NAME: &str = "Default";

/// Minimum length of an id prefix accepted by `resolve`.
const MIN_PREFIX_LEN: usize = 4;

/// A named group of changed paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changelist {
    /// Unique identifier (ULID string)
    pub id: String,
    /// User-facing label
    pub name: String,
    /// Absolute, normalized member paths
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Whether new changes land here
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Changelist {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            files: Vec::new(),
            active: false,
            description,
        }
    }

    /// True if `path` is a member (compared by normalized key).
    pub fn contains(&self, path: &Path) -> bool {
        self.position_of(path).is_some()
    }

    fn position_of(&self, path: &Path) -> Option<usize> {
        let key = paths::comparison_key(path);
        self.files
            .iter()
            .position(|f| paths::comparison_key(f) == key)
    }
}

/// What a single reassignment changed.
#[derive(Debug, Default, Clone, Copy)]
struct Reassignment {
    /// Path was not in the target before
    added: bool,
    /// Path was dropped from at least one other changelist
    removed_elsewhere: bool,
}

impl Reassignment {
    fn changed(self) -> bool {
        self.added || self.removed_elsewhere
    }
}

/// Persistent collection of changelists.
#[derive(Debug)]
pub struct ChangelistStore {
    /// Backing file; `None` for in-memory stores
    file: Option<PathBuf>,
    changelists: Vec<Changelist>,
}

impl ChangelistStore {
    /// Loads `changelists.json`, repairing invariants and synthesizing the
    /// default changelist if needed. Repairs are written back immediately.
    pub fn load(layout: &Layout) -> Result<Self> {
        let file = layout.changelists_file();
        let changelists = match read_optional(&file)? {
            Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .map_err(|e| Error::json(format!("parsing {}", file.display()), e))?,
            _ => Vec::new(),
        };

        let mut store = Self {
            file: Some(file),
            changelists,
        };

        if store.repair() {
            store.save()?;
        }

        debug!("Loaded {} changelists", store.changelists.len());
        Ok(store)
    }

    /// Store without a backing file, seeded with the default changelist.
    pub fn in_memory() -> Self {
        let mut store = Self {
            file: None,
            changelists: Vec::new(),
        };
        store.repair();
        store
    }

    /// Writes the whole store to disk (no-op for in-memory stores).
    pub fn save(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.changelists)
            .map_err(|e| Error::json("serializing changelists", e))?;
        atomic_write(file, &json)
    }

    /// Restores store invariants. Returns true if anything changed.
    fn repair(&mut self) -> bool {
        let mut changed = false;

        if self.changelists.is_empty() {
            let mut default = Changelist::new(DEFAULT_CHANGELIST_NAME, None);
            default.active = true;
            info!("Created default changelist {}", default.id);
            self.changelists.push(default);
            return true;
        }

        // Exactly one active: keep the first flagged, or promote the first
        let mut seen_active = false;
        for changelist in &mut self.changelists {
            if changelist.active {
                if seen_active {
                    warn!("Clearing extra active flag on changelist {}", changelist.id);
                    changelist.active = false;
                    changed = true;
                }
                seen_active = true;
            }
        }
        if !seen_active {
            warn!("No active changelist, promoting {}", self.changelists[0].id);
            self.changelists[0].active = true;
            changed = true;
        }

        // Normalize paths and keep only the first owner of each path
        let mut owned = ahash::AHashSet::new();
        for changelist in &mut self.changelists {
            let before = changelist.files.len();
            let mut files = Vec::with_capacity(before);
            for file in changelist.files.drain(..) {
                let normalized = paths::normalize(&file);
                if normalized != file {
                    changed = true;
                }
                if owned.insert(paths::comparison_key(&normalized)) {
                    files.push(normalized);
                }
            }
            if files.len() != before {
                warn!(
                    "Dropped {} duplicate memberships from changelist {}",
                    before - files.len(),
                    changelist.id
                );
                changed = true;
            }
            changelist.files = files;
        }

        changed
    }

    /// Every changelist, in creation order.
    pub fn changelists(&self) -> &[Changelist] {
        &self.changelists
    }

    pub fn get(&self, id: &str) -> Option<&Changelist> {
        self.changelists.iter().find(|c| c.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.changelists.iter().position(|c| c.id == id)
    }

    /// Resolves a user reference: full id, unique id prefix, or exact name.
    pub fn resolve(&self, reference: &str) -> Option<&Changelist> {
        if let Some(changelist) = self.get(reference) {
            return Some(changelist);
        }

        if reference.len() >= MIN_PREFIX_LEN {
            let upper = reference.to_uppercase();
            let mut matches = self.changelists.iter().filter(|c| c.id.starts_with(&upper));
            if let (Some(found), None) = (matches.next(), matches.next()) {
                return Some(found);
            }
        }

        self.changelists.iter().find(|c| c.name == reference)
    }

    /// Creates a new, non-active changelist. Names need not be unique.
    pub fn create_changelist(
        &mut self,
        name: &str,
        description: Option<String>,
    ) -> Result<Changelist> {
        let changelist = Changelist::new(name, description);
        self.changelists.push(changelist.clone());
        self.save()?;
        info!("Created changelist {} ({})", changelist.name, changelist.id);
        Ok(changelist)
    }

    /// Returns the active changelist, repairing the store if needed.
    pub fn get_active_changelist(&mut self) -> Result<&Changelist> {
        let index = self.ensure_active()?;
        Ok(&self.changelists[index])
    }

    /// Id of the active changelist without repairing.
    pub fn active_id(&self) -> Option<&str> {
        self.changelists
            .iter()
            .find(|c| c.active)
            .map(|c| c.id.as_str())
    }

    fn ensure_active(&mut self) -> Result<usize> {
        if let Some(index) = self.changelists.iter().position(|c| c.active) {
            return Ok(index);
        }
        self.repair();
        self.save()?;
        Ok(self
            .changelists
            .iter()
            .position(|c| c.active)
            .unwrap_or(0))
    }

    /// Makes `id` the only active changelist. False if `id` is unknown.
    pub fn set_active_changelist(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };

        for changelist in &mut self.changelists {
            changelist.active = false;
        }
        self.changelists[index].active = true;
        self.save()?;
        info!("Activated changelist {}", id);
        Ok(true)
    }

    /// Moves `path` into the changelist at `target`, removing it everywhere else.
    fn reassign(&mut self, path: &Path, target: usize) -> Reassignment {
        let path = paths::normalize(path);
        let mut outcome = Reassignment::default();
        let mut was_in_target = false;

        for (index, changelist) in self.changelists.iter_mut().enumerate() {
            if let Some(position) = changelist.position_of(&path) {
                if index == target {
                    was_in_target = true;
                } else {
                    changelist.files.remove(position);
                    outcome.removed_elsewhere = true;
                }
            }
        }

        if !was_in_target {
            debug!(
                "Assigned {} to changelist {}",
                path.display(),
                self.changelists[target].id
            );
            self.changelists[target].files.push(path);
            outcome.added = true;
        }
        outcome
    }

    /// Assigns `path` to `id`, or to the active changelist when `id` is `None`.
    ///
    /// Returns whether the path was newly added to the target. An unknown
    /// explicit target returns false without side effects.
    pub fn add_file_to_changelist(&mut self, path: &Path, id: Option<&str>) -> Result<bool> {
        let target = match id {
            Some(id) => match self.index_of(id) {
                Some(index) => index,
                None => return Ok(false),
            },
            None => self.ensure_active()?,
        };

        let outcome = self.reassign(path, target);
        if outcome.changed() {
            self.save()?;
        }
        Ok(outcome.added)
    }

    /// Moves `path` into `id`. An unknown target leaves the file where it was
    /// and returns false.
    pub fn move_file_to_changelist(&mut self, path: &Path, id: &str) -> Result<bool> {
        let Some(target) = self.index_of(id) else {
            return Ok(false);
        };
        if self.reassign(path, target).changed() {
            self.save()?;
        }
        Ok(true)
    }

    /// Removes `path` from `id` only. False if it was not a member there.
    pub fn remove_file_from_changelist(&mut self, path: &Path, id: &str) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let Some(position) = self.changelists[index].position_of(path) else {
            return Ok(false);
        };
        self.changelists[index].files.remove(position);
        self.save()?;
        Ok(true)
    }

    /// Deletes a changelist and merges its files into the active one.
    ///
    /// False if `id` is unknown or is the only changelist left.
    pub fn delete_changelist(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        if self.changelists.len() <= 1 {
            return Ok(false);
        }

        let removed = self.changelists.remove(index);
        if removed.active {
            // Next one in line, or the previous one if it was last
            let promoted = index.min(self.changelists.len() - 1);
            self.changelists[promoted].active = true;
            info!("Promoted changelist {} to active", self.changelists[promoted].id);
        }

        let target = self
            .changelists
            .iter()
            .position(|c| c.active)
            .unwrap_or(0);
        let moved = removed.files.len();
        for file in &removed.files {
            self.reassign(file, target);
        }

        self.save()?;
        info!(
            "Deleted changelist {} ({} files reassigned)",
            removed.id, moved
        );
        Ok(true)
    }

    /// Drops every membership whose path is not in `existing`.
    ///
    /// Returns how many memberships were dropped.
    pub fn clear_empty_files(&mut self, existing: &[PathBuf]) -> Result<usize> {
        let keep: ahash::AHashSet<String> =
            existing.iter().map(|p| paths::comparison_key(p)).collect();

        let mut dropped = 0;
        for changelist in &mut self.changelists {
            let before = changelist.files.len();
            changelist
                .files
                .retain(|f| keep.contains(&paths::comparison_key(f)));
            dropped += before - changelist.files.len();
        }

        if dropped > 0 {
            debug!("Pruned {} stale memberships", dropped);
            self.save()?;
        }
        Ok(dropped)
    }

    /// The changelist owning `path`, if any.
    pub fn get_changelist_for_file(&self, path: &Path) -> Option<&Changelist> {
        self.owner_index(path).map(|i| &self.changelists[i])
    }

    fn owner_index(&self, path: &Path) -> Option<usize> {
        self.changelists.iter().position(|c| c.contains(path))
    }

    pub fn rename_changelist(&mut self, id: &str, name: &str) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        self.changelists[index].name = name.to_string();
        self.save()?;
        Ok(true)
    }

    pub fn set_changelist_description(
        &mut self,
        id: &str,
        description: Option<String>,
    ) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        self.changelists[index].description = description;
        self.save()?;
        Ok(true)
    }
}
