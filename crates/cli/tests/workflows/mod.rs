//! Workflow integration tests
//!
//! Tests for complete workflows that exercise multiple commands
//! and validate end-to-end behavior.

pub mod changelist_lifecycle;
pub mod config_commands;
pub mod edge_cases;
pub mod shelve_unshelve;
