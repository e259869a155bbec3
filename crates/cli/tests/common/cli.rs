//! Runs the `cl` binary built for this test run
//!
//! `ClCommand` captures stdout, stderr and the exit code of one invocation;
//! the `cl!` macro builds one from a directory and arguments.

use anyhow::{ensure, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// One `cl` invocation.
pub struct ClCommand {
    cwd: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ClCommand {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    #[allow(dead_code)]
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Runs to completion, whatever the exit status.
    pub fn execute(&self) -> Result<CommandResult> {
        let started = Instant::now();
        let output = Command::new(env!("CARGO_BIN_EXE_cl"))
            .current_dir(&self.cwd)
            .args(&self.args)
            .env_remove("RUST_LOG")
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .output()
            .with_context(|| format!("spawning cl {}", self.args.join(" ")))?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: started.elapsed(),
        })
    }

    /// Runs and requires exit code 0.
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        ensure!(
            result.success(),
            "cl {} exited with {}\n--- stdout\n{}\n--- stderr\n{}",
            self.args.join(" "),
            result.exit_code,
            result.stdout,
            result.stderr
        );
        Ok(result)
    }

    /// Runs and requires a non-zero exit code.
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        ensure!(
            !result.success(),
            "cl {} unexpectedly succeeded\n--- stdout\n{}",
            self.args.join(" "),
            result.stdout
        );
        Ok(result)
    }
}

/// Captured outcome of one invocation.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[allow(dead_code)]
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// `cl!(dir, "move", "a.txt", "--to", "Feature")`
#[macro_export]
macro_rules! cl {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::ClCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
