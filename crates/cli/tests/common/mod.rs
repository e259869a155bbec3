//! Common utilities for integration tests

pub mod cli;

pub use fixtures::{git_available, TestRepo};
