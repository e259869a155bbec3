//! Changelist and shelf state management
//!
//! This crate provides:
//! - The changelist store (mutually exclusive groups of changed paths)
//! - The shelf store (changes set aside as durable patches)
//! - Affected-path recovery from patch text
//! - The reconciliation pass run on every refresh
//! - A `Workspace` session tying the stores to a VCS collaborator

pub mod changelist;
pub mod patch;
pub mod reconcile;
pub mod shelf;
pub mod workspace;

#[cfg(test)]
mod testing;

// Re-exports
pub use changelist::{Changelist, ChangelistStore, DEFAULT_CHANGELIST_NAME};
pub use reconcile::{ReconcileReport, Reconciler};
pub use shelf::{ShelfStore, ShelvedChange};
pub use workspace::Workspace;
