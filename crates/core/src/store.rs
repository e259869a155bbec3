//! On-disk layout of a changelist workspace and atomic file writes

use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the metadata directory at the workspace root.
pub const CL_DIR: &str = ".cl";

/// File-name extension of standalone shelf patches.
pub const PATCH_EXTENSION: &str = "patch";

/// Paths of every persisted artifact in a workspace.
///
/// Manages the `.cl/` directory structure:
/// ```text
/// .cl/
///   config.toml
///   changelists.json
///   shelves.json
///   shelves/
///     <shelf-id>.patch
///   locks/
///     cl.lock
///   logs/
/// ```
#[derive(Debug, Clone)]
pub struct Layout {
    /// Root of the working tree
    root: PathBuf,
    /// Path to the .cl directory
    cl_dir: PathBuf,
}

impl Layout {
    /// Layout for `root` without touching the filesystem.
    pub fn new(root: &Path) -> Self {
        let root = crate::paths::normalize(root);
        let cl_dir = root.join(CL_DIR);
        Self { root, cl_dir }
    }

    /// Creates the `.cl/` directory tree. Idempotent.
    ///
    /// A `.gitignore` inside `.cl/` keeps workspace metadata out of the
    /// working tree status.
    pub fn init(root: &Path) -> Result<Self> {
        let layout = Self::new(root);
        layout.ensure_dirs()?;

        let ignore = layout.cl_dir.join(".gitignore");
        if !ignore.exists() {
            atomic_write(&ignore, b"*\n")?;
        }
        Ok(layout)
    }

    /// Opens an existing workspace, failing if `.cl/` is absent.
    pub fn open(root: &Path) -> Result<Self> {
        let layout = Self::new(root);
        if !layout.cl_dir.is_dir() {
            return Err(Error::NotInitialized(layout.root.clone()));
        }
        layout.ensure_dirs()?;
        Ok(layout)
    }

    /// Walks up from `start` looking for a directory containing `.cl/`.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = crate::paths::normalize(start);
        loop {
            if current.join(CL_DIR).is_dir() {
                return Self::open(&current);
            }
            if !current.pop() {
                return Err(Error::NotInitialized(start.to_path_buf()));
            }
        }
    }

    fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.cl_dir.clone(), self.shelves_dir(), self.locks_dir(), self.logs_dir()] {
            fs::create_dir_all(&dir)
                .map_err(|e| Error::io(format!("creating {}", dir.display()), e))?;
        }
        Ok(())
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.cl/` directory.
    pub fn cl_dir(&self) -> &Path {
        &self.cl_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.cl_dir.join("config.toml")
    }

    pub fn changelists_file(&self) -> PathBuf {
        self.cl_dir.join("changelists.json")
    }

    pub fn shelves_file(&self) -> PathBuf {
        self.cl_dir.join("shelves.json")
    }

    pub fn shelves_dir(&self) -> PathBuf {
        self.cl_dir.join("shelves")
    }

    /// Standalone patch file of a shelf, named deterministically from its id.
    pub fn shelf_patch_file(&self, shelf_id: &str) -> PathBuf {
        self.shelves_dir()
            .join(format!("{}.{}", shelf_id, PATCH_EXTENSION))
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.cl_dir.join("locks")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.cl_dir.join("logs")
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file next to `target`, flushes it, then
/// renames it over the target. Readers never observe a half-written file.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| Error::io(format!("creating {}", dir.display()), e))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::io(format!("creating temp file in {}", dir.display()), e))?;

    tmp.write_all(data)
        .map_err(|e| Error::io(format!("writing temp file for {}", target.display()), e))?;

    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(format!("syncing temp file for {}", target.display()), e))?;

    tmp.persist(target)
        .map_err(|e| Error::io(format!("persisting {}", target.display()), e.error))?;

    Ok(())
}

/// Reads a file to a string, returning `None` if it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(format!("reading {}", path.display()), e)),
    }
}

/// Removes a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(format!("removing {}", path.display()), e)),
    }
}
