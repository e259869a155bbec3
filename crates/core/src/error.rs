//! Error types shared by every changelist crate.

use std::path::PathBuf;

/// All errors that can occur in changelist and shelf operations.
///
/// Guards that protect store invariants (deleting the last changelist,
/// activating an unknown id) are reported through `bool` returns, not here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────
    // Not found
    // ─────────────────────────────────────────────────────────────────────
    #[error("Changelist not found: {0}")]
    ChangelistNotFound(String),

    #[error("Shelved change not found: {0}")]
    ShelfNotFound(String),

    #[error("Patch file for shelved change {id} is missing: {path}")]
    PatchFileMissing { id: String, path: PathBuf },

    #[error("Not a changelist workspace (no .cl directory at {0})")]
    NotInitialized(PathBuf),

    // ─────────────────────────────────────────────────────────────────────
    // External tool
    // ─────────────────────────────────────────────────────────────────────
    #[error("Command failed: {command}: {details}")]
    CommandFailed { command: String, details: String },

    #[error("Diff of {0} is not UTF-8 and git would not encode it as binary")]
    UnencodableDiff(PathBuf),

    #[error("Nothing to shelve: none of the given files has unstaged changes")]
    NothingToShelve,

    // ─────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ─────────────────────────────────────────────────────────────────────
    // I/O
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Wraps an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps a JSON error with a short description of what was being done.
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            context: context.into(),
            source,
        }
    }

    /// True for the not-found family (unknown ids, missing patch files).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ChangelistNotFound(_) | Error::ShelfNotFound(_) | Error::PatchFileMissing { .. }
        )
    }
}

/// Convenience type alias for Results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
