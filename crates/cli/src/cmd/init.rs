//! Initialize a changelist workspace

use crate::locks::WorkspaceLock;
use anyhow::{Context, Result};
use cl_core::{store::CL_DIR, Layout};
use git::GitCli;
use journal::Workspace;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    // 1. Locate the repository top level
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let root = GitCli::toplevel(&current_dir)
        .await
        .context("Not inside a git repository")?;

    if root.join(CL_DIR).is_dir() {
        println!(
            "{} Workspace already initialized at {}",
            "•".yellow(),
            root.join(CL_DIR).display()
        );
        return Ok(());
    }

    // 2. Create .cl/ and lock it
    let layout = Layout::init(&root).context("Failed to create workspace directory")?;
    let _lock = WorkspaceLock::acquire(&layout.locks_dir())?;

    // 3. Open the workspace and pick up existing changes
    let mut workspace = Workspace::init(&root, Box::new(GitCli::new(&root)))
        .context("Failed to initialize workspace")?;
    let report = workspace.refresh().await.context("Failed to read working tree")?;

    // 4. Display output
    println!("{} Initialized changelist workspace at {}", "✓".green(), root.display());
    println!();
    println!("Created {}/ directory structure:", CL_DIR);
    println!("  - {}/changelists.json  (changelist membership)", CL_DIR);
    println!("  - {}/shelves.json      (shelf records)", CL_DIR);
    println!("  - {}/shelves/          (shelf patches)", CL_DIR);
    println!("  - {}/config.toml       (settings)", CL_DIR);
    println!();
    if !report.assigned.is_empty() {
        println!(
            "Assigned {} changed files to the default changelist",
            report.assigned.len().to_string().cyan()
        );
        println!();
    }
    println!("Next steps:");
    println!("  - Run 'cl status' to see changelists");
    println!("  - Run 'cl changelist create <name>' to start grouping changes");
    Ok(())
}
