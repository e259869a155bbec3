//! Thin wrapper around the `git` binary

use cl_core::{Error, Result};
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Runs `git <args>` in `root` and returns the raw output, whatever the exit status.
pub async fn run(root: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {}", args.join(" "));

    Command::new("git")
        .current_dir(root)
        .args(args)
        // Keep output stable regardless of user config
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("LC_ALL", "C")
        .output()
        .await
        .map_err(|e| Error::CommandFailed {
            command: format!("git {}", args.join(" ")),
            details: format!("failed to execute git: {}", e),
        })
}

/// Runs `git <args>` in `root` and returns stdout, failing on a non-zero exit.
pub async fn run_checked(root: &Path, args: &[&str]) -> Result<String> {
    let output = run(root, args).await?;
    check(args, &output)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs a `git diff` variant and returns raw stdout.
///
/// With `--no-index`, exit status 1 only means the inputs differ.
pub async fn run_diff(root: &Path, args: &[&str]) -> Result<Vec<u8>> {
    let output = run(root, args).await?;
    let no_index = args.contains(&"--no-index");
    if !(no_index && output.status.code() == Some(1)) {
        check(args, &output)?;
    }
    Ok(output.stdout)
}

/// Turns a non-zero exit status into `Error::CommandFailed`.
pub fn check(args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let details = if stderr.trim().is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.trim().to_string()
    };
    Err(Error::CommandFailed {
        command: format!("git {}", args.join(" ")),
        details,
    })
}

/// True if `git` can be executed at all.
pub async fn available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}
