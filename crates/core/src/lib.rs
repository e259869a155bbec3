//! Changelists Core - shared primitives for the changelist/shelf engine
//!
//! This crate provides the foundational layer:
//! - Path normalization and containment checks
//! - Hierarchical grouping of flat path lists for display
//! - On-disk `.cl/` layout and atomic writes
//! - Workspace settings (`.cl/config.toml`)
//! - The `Vcs` capability surface consumed by the stores

pub mod config;
pub mod error;
pub mod paths;
pub mod store;
pub mod tree;
pub mod vcs;

// Re-export main types for convenience
pub use config::Settings;
pub use error::{Error, Result};
pub use store::Layout;
pub use tree::{flatten, group_paths, GroupingOptions, TreeNode};
pub use vcs::{FileStatus, Rename, StatusSnapshot, Vcs, WorkingTreeStatus};
