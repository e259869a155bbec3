//! CLI command implementations

pub mod changelist;
pub mod config;
pub mod init;
pub mod move_files;
pub mod refresh;
pub mod shelf;
pub mod shelve;
pub mod status;
pub mod unshelve;
