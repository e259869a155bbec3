//! Workspace lock serializing mutating `cl` invocations
//!
//! Held for the whole duration of a command that writes changelist or shelf
//! state, so two concurrent refreshes never interleave their writes. The lock
//! file names its holder, which makes contention errors actionable.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = "cl.lock";

/// How long to wait for another invocation to finish.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Exclusive lock on `.cl/locks/cl.lock`, released on drop.
pub struct WorkspaceLock {
    path: PathBuf,
    // Keeps the flock alive
    _file: File,
}

/// Who holds the lock, as recorded in the lock file.
#[derive(Debug, Serialize, Deserialize)]
struct LockHolder {
    pid: u32,
    /// Arguments of the holding invocation
    command: String,
    acquired_at: DateTime<Utc>,
}

impl LockHolder {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            command: std::env::args().skip(1).collect::<Vec<_>>().join(" "),
            acquired_at: Utc::now(),
        }
    }

    fn write_to(&self, file: &mut File) -> Result<()> {
        let json = serde_json::to_vec(self).context("Failed to serialize lock holder")?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&json)?;
        file.sync_all()?;
        Ok(())
    }

    fn read_from(file: &mut File) -> Result<Self> {
        let mut contents = String::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_string(&mut contents)?;
        serde_json::from_str(&contents).context("Failed to parse lock holder")
    }

    fn describe(&self) -> String {
        format!(
            "pid {} running 'cl {}' since {}",
            self.pid,
            self.command,
            self.acquired_at.format("%H:%M:%S")
        )
    }
}

impl WorkspaceLock {
    /// Takes the workspace lock, waiting for a live holder to release it.
    ///
    /// Locks left behind by dead processes are removed.
    pub fn acquire(locks_dir: &Path) -> Result<Self> {
        Self::acquire_within(locks_dir, ACQUIRE_TIMEOUT)
    }

    fn acquire_within(locks_dir: &Path, timeout: Duration) -> Result<Self> {
        std::fs::create_dir_all(locks_dir).context("Failed to create locks directory")?;
        let path = locks_dir.join(LOCK_FILE);
        let deadline = Instant::now() + timeout;

        loop {
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;

            if try_flock_exclusive(&file)? {
                // The previous holder may have unlinked the file we opened
                if !still_linked(&file, &path) {
                    continue;
                }
                LockHolder::current().write_to(&mut file)?;
                tracing::debug!("Acquired workspace lock {}", path.display());
                return Ok(Self { path, _file: file });
            }

            // Holder may not have written itself yet; treat that as live
            let holder = LockHolder::read_from(&mut file).ok();
            if let Some(holder) = holder.as_ref().filter(|h| !is_process_alive(h.pid)) {
                tracing::warn!("Removing stale workspace lock ({})", holder.describe());
                drop(file);
                std::fs::remove_file(&path).context("Failed to remove stale lock")?;
                continue;
            }

            if Instant::now() >= deadline {
                let who = holder
                    .map(|h| h.describe())
                    .unwrap_or_else(|| "unknown holder".to_string());
                anyhow::bail!(
                    "Another cl command is using this workspace ({}); lock file: {}",
                    who,
                    path.display()
                );
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(()) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e).context("flock failed"),
    }
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> Result<bool> {
    Ok(true)
}

/// True if `path` still names the inode `file` refers to.
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(open), Ok(named)) => open.dev() == named.dev() && open.ino() == named.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, _path: &Path) -> bool {
    true
}

#[cfg(target_os = "linux")]
fn is_process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Null signal: existence check only
    !matches!(
        kill(Pid::from_raw(pid as i32), None),
        Err(nix::errno::Errno::ESRCH)
    )
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}
