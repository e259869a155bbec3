//! One changelist workspace session
//!
//! Owns the layout, settings, both stores and the VCS collaborator. Front
//! ends open one `Workspace` per invocation and go through it for every
//! operation that touches more than one store.

use crate::changelist::ChangelistStore;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::shelf::{ShelfStore, ShelvedChange};
use cl_core::{Error, Layout, Result, Settings, Vcs, WorkingTreeStatus};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;

pub struct Workspace {
    layout: Layout,
    settings: Settings,
    changelists: ChangelistStore,
    shelves: ShelfStore,
    vcs: Box<dyn Vcs>,
    reconciler: Reconciler,
}

impl Workspace {
    /// Creates `.cl/` under `root` (if needed) and opens it.
    pub fn init(root: &Path, vcs: Box<dyn Vcs>) -> Result<Self> {
        let layout = Layout::init(root)?;
        Settings::init_if_missing(&layout)?;
        Self::from_layout(layout, vcs)
    }

    /// Opens an initialized workspace rooted at `root`.
    pub fn open(root: &Path, vcs: Box<dyn Vcs>) -> Result<Self> {
        Self::from_layout(Layout::open(root)?, vcs)
    }

    fn from_layout(layout: Layout, vcs: Box<dyn Vcs>) -> Result<Self> {
        let settings = Settings::load(&layout)?;
        let changelists = ChangelistStore::load(&layout)?;
        let shelves = ShelfStore::load(&layout)?;
        let reconciler = Reconciler::new(settings.reconcile.auto_stage);

        Ok(Self {
            layout,
            settings,
            changelists,
            shelves,
            vcs,
            reconciler,
        })
    }

    /// Sends a report to `tx` after every refresh.
    pub fn with_notifier(mut self, tx: mpsc::Sender<ReconcileReport>) -> Self {
        self.reconciler = self.reconciler.with_notifier(tx);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    pub fn changelists(&self) -> &ChangelistStore {
        &self.changelists
    }

    pub fn changelists_mut(&mut self) -> &mut ChangelistStore {
        &mut self.changelists
    }

    pub fn shelves(&self) -> &ShelfStore {
        &self.shelves
    }

    pub fn shelves_mut(&mut self) -> &mut ShelfStore {
        &mut self.shelves
    }

    /// Live working tree status with absolute paths.
    pub async fn status(&self) -> Result<WorkingTreeStatus> {
        Ok(self.vcs.status().await?.resolve(self.layout.root()))
    }

    /// Reconciles changelist membership with the working tree.
    pub async fn refresh(&mut self) -> Result<ReconcileReport> {
        self.reconciler
            .run(self.vcs.as_ref(), &mut self.changelists)
            .await
    }

    /// Shelves every file of a changelist, then refreshes.
    ///
    /// `name` falls back to `shelf.default_name`.
    pub async fn shelve_changelist(
        &mut self,
        changelist_id: &str,
        name: Option<&str>,
        description: Option<String>,
    ) -> Result<ShelvedChange> {
        let changelist = self
            .changelists
            .get(changelist_id)
            .ok_or_else(|| Error::ChangelistNotFound(changelist_id.to_string()))?;
        let files = changelist.files.clone();
        let name = name.unwrap_or(&self.settings.shelf.default_name).to_string();

        let shelf = self
            .shelves
            .shelve_changes(self.vcs.as_ref(), &name, &files, description)
            .await?;

        self.refresh().await?;
        Ok(shelf)
    }

    /// Applies a shelf and assigns its files to `target` (or the active
    /// changelist), then refreshes.
    ///
    /// Returns the files the shelf touches.
    pub async fn unshelve(
        &mut self,
        shelf_id: &str,
        target: Option<&str>,
        remove_after_apply: bool,
    ) -> Result<Vec<PathBuf>> {
        let target_id = match target {
            Some(id) => {
                self.changelists
                    .get(id)
                    .ok_or_else(|| Error::ChangelistNotFound(id.to_string()))?
                    .id
                    .clone()
            }
            None => self.changelists.get_active_changelist()?.id.clone(),
        };

        // Read before applying: removal deletes the record
        let affected = self.shelves.affected_files(shelf_id)?;

        self.shelves
            .unshelve_changes(self.vcs.as_ref(), shelf_id, remove_after_apply)
            .await?;

        for path in &affected {
            self.changelists.add_file_to_changelist(path, Some(&target_id))?;
        }
        info!(
            "Unshelved {} into changelist {} ({} files)",
            shelf_id,
            target_id,
            affected.len()
        );

        self.refresh().await?;
        Ok(affected)
    }

    /// Replaces the settings and writes them to `config.toml`.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.save(&self.layout)?;
        self.reconciler.set_auto_stage(settings.reconcile.auto_stage);
        self.settings = settings;
        Ok(())
    }
}
