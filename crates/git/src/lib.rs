//! Git collaborator for changelist workspaces
//!
//! Implements [`cl_core::Vcs`] by driving the `git` command line:
//! - status from `git status --porcelain -z`
//! - per-file diffs from `git diff`, synthesized for untracked files and
//!   base85-encoded when the content is not UTF-8
//! - staging with `git add`, reverting with `git checkout`
//! - patch application with `git apply`

pub mod diff;
pub mod git_ops;
pub mod status;

use async_trait::async_trait;
use cl_core::{paths, Error, Result, StatusSnapshot, Vcs};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `Vcs` backed by the git binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Collaborator for the repository whose top level is `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: paths::normalize(root),
        }
    }

    /// Top level of the git repository containing `start`.
    pub async fn toplevel(start: &Path) -> Result<PathBuf> {
        let out = git_ops::run_checked(start, &["rev-parse", "--show-toplevel"]).await?;
        Ok(paths::normalize(Path::new(out.trim())))
    }

    /// Path relative to the repository root, `/`-separated.
    fn rel(&self, path: &Path) -> String {
        match paths::relative_to(&self.root, path) {
            Some(rel) => paths::to_slash(&rel),
            None => paths::to_slash(path),
        }
    }

    async fn is_tracked(&self, rel: &str) -> Result<bool> {
        let output = git_ops::run(&self.root, &["ls-files", "--error-unmatch", "--", rel]).await?;
        Ok(output.status.success())
    }

    async fn is_untracked(&self, rel: &str) -> Result<bool> {
        let out = git_ops::run_checked(
            &self.root,
            &["ls-files", "--others", "--exclude-standard", "--", rel],
        )
        .await?;
        Ok(!out.trim().is_empty())
    }

    /// New-file patch for an untracked path.
    async fn untracked_diff(&self, rel: &str, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;

        match std::str::from_utf8(&bytes) {
            Ok(content) if !diff::is_binary(&bytes) => {
                Ok(diff::new_file_diff(rel, content, is_executable(path).await))
            }
            _ => {
                let args = ["diff", "--no-index", "--binary", "--", "/dev/null", rel];
                self.diff_text(&args, path).await
            }
        }
    }

    /// Runs a diff and decodes it, re-running with every path marked
    /// binary when the text output is not UTF-8.
    async fn diff_text(&self, args: &[&str], path: &Path) -> Result<String> {
        let out = git_ops::run_diff(&self.root, args).await?;
        if let Ok(text) = String::from_utf8(out) {
            return Ok(text);
        }

        debug!("{} is not UTF-8, diffing as binary", path.display());
        let attributes = binary_attributes()?;
        let setting = format!("core.attributesFile={}", attributes.path().display());
        let mut forced = vec!["-c", setting.as_str()];
        forced.extend_from_slice(args);

        let out = git_ops::run_diff(&self.root, &forced).await?;
        String::from_utf8(out).map_err(|_| Error::UnencodableDiff(path.to_path_buf()))
    }
}

/// Attributes file marking every path `-diff`, so `--binary` emits
/// base85 literals instead of raw bytes.
fn binary_attributes() -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("cl-attributes-")
        .tempfile()
        .map_err(|e| Error::io("creating attributes file", e))?;
    file.write_all(b"* -diff\n")
        .map_err(|e| Error::io("writing attributes file", e))?;
    Ok(file)
}

#[cfg(unix)]
async fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::metadata(path)
        .await
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
async fn is_executable(_path: &Path) -> bool {
    false
}

#[async_trait]
impl Vcs for GitCli {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn status(&self) -> Result<StatusSnapshot> {
        let out = git_ops::run_checked(
            &self.root,
            &["status", "--porcelain", "-z", "--untracked-files=all"],
        )
        .await?;
        Ok(status::parse_porcelain(&out))
    }

    async fn diff(&self, path: &Path, staged: bool) -> Result<String> {
        let rel = self.rel(path);

        let mut args = vec!["diff", "--no-color", "--no-ext-diff", "--binary"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--", rel.as_str()]);

        let out = self.diff_text(&args, path).await?;
        if !out.is_empty() || staged {
            return Ok(out);
        }

        if self.is_untracked(&rel).await? {
            debug!("Synthesizing new-file diff for {}", rel);
            return self.untracked_diff(&rel, path).await;
        }
        Ok(String::new())
    }

    async fn stage_files(&self, files: &[PathBuf]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let rels: Vec<String> = files.iter().map(|p| self.rel(p)).collect();
        let mut args = vec!["add", "--"];
        args.extend(rels.iter().map(String::as_str));
        git_ops::run_checked(&self.root, &args).await?;
        Ok(())
    }

    async fn revert_file(&self, path: &Path) -> Result<()> {
        let rel = self.rel(path);

        if self.is_tracked(&rel).await? {
            git_ops::run_checked(&self.root, &["checkout", "--", &rel]).await?;
            return Ok(());
        }

        // Untracked: reverting means removing it
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("removing {}", path.display()), e)),
        }
    }

    async fn apply_patch_file(&self, patch: &Path) -> Result<()> {
        let patch = patch.to_string_lossy();
        git_ops::run_checked(&self.root, &["apply", "--whitespace=nowarn", &patch]).await?;
        Ok(())
    }
}
