//! Reconciliation of changelist membership with live working tree status
//!
//! Run on every refresh. New changes land in the active changelist, paths
//! that no longer carry a change are dropped from every changelist, and
//! newly assigned paths are optionally staged in one batch.

use crate::changelist::ChangelistStore;
use cl_core::{Result, Vcs};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Paths newly assigned to the active changelist
    pub assigned: Vec<PathBuf>,
    /// Memberships dropped because their path no longer has changes
    pub pruned: usize,
    /// Paths handed to the VCS for staging
    pub staged: Vec<PathBuf>,
    /// Number of changed paths seen in the working tree
    pub changed: usize,
}

impl ReconcileReport {
    /// True if the pass changed no membership.
    pub fn is_noop(&self) -> bool {
        self.assigned.is_empty() && self.pruned == 0
    }
}

/// Syncs a [`ChangelistStore`] with the working tree.
pub struct Reconciler {
    /// Stage paths as they are newly assigned
    auto_stage: bool,

    /// Observers of completed passes
    report_tx: Option<mpsc::Sender<ReconcileReport>>,
}

impl Reconciler {
    pub fn new(auto_stage: bool) -> Self {
        Self {
            auto_stage,
            report_tx: None,
        }
    }

    /// Sends a report to `tx` after every pass.
    pub fn with_notifier(mut self, tx: mpsc::Sender<ReconcileReport>) -> Self {
        self.report_tx = Some(tx);
        self
    }

    pub fn set_auto_stage(&mut self, auto_stage: bool) {
        self.auto_stage = auto_stage;
    }

    /// Runs one pass. Running it twice against the same status changes nothing
    /// the second time.
    pub async fn run(&self, vcs: &dyn Vcs, store: &mut ChangelistStore) -> Result<ReconcileReport> {
        // 1. Read live status with absolute paths
        let status = vcs.status().await?.resolve(vcs.root());
        let changed = status.all_changed();

        // 2. Assign ownerless changes to the active changelist
        let mut report = ReconcileReport {
            changed: changed.len(),
            ..ReconcileReport::default()
        };
        let mut to_stage = Vec::new();
        for path in &changed {
            if store.get_changelist_for_file(path).is_some() {
                continue;
            }
            if store.add_file_to_changelist(path, None)? {
                debug!("New change {}", path.display());
                report.assigned.push(path.clone());
                if self.auto_stage {
                    to_stage.push(path.clone());
                }
            }
        }

        // 3. Drop memberships whose path no longer has changes
        report.pruned = store.clear_empty_files(&changed)?;

        // 4. Stage in one batch
        if !to_stage.is_empty() {
            vcs.stage_files(&to_stage).await?;
            report.staged = to_stage;
        }

        if report.is_noop() {
            debug!("Reconcile: no membership changes");
        } else {
            info!(
                "Reconcile: {} assigned, {} pruned, {} staged",
                report.assigned.len(),
                report.pruned,
                report.staged.len()
            );
        }

        // 5. Notify observers
        if let Some(tx) = &self.report_tx {
            if let Err(e) = tx.try_send(report.clone()) {
                warn!("Failed to send reconcile report: {}", e);
            }
        }

        Ok(report)
    }
}
