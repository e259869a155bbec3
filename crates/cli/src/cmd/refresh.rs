//! Reconcile changelists with the working tree

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    // 1. Lock and open
    let (_lock, mut workspace) = util::lock_and_open()?;
    let root = workspace.layout().root().to_path_buf();

    // 2. Reconcile
    let report = workspace.refresh().await.context("Failed to refresh")?;

    // 3. Display output
    if report.is_noop() {
        println!(
            "{} Up to date ({} changed files)",
            "✓".green(),
            report.changed
        );
        return Ok(());
    }

    let active = workspace
        .changelists_mut()
        .get_active_changelist()?
        .name
        .clone();

    for path in &report.assigned {
        println!(
            "  {} {} → {}",
            "+".green(),
            util::display_path(&root, path),
            active.yellow()
        );
    }
    if report.pruned > 0 {
        println!(
            "  {} {} unchanged files dropped from changelists",
            "-".red(),
            report.pruned
        );
    }
    if !report.staged.is_empty() {
        println!("  Staged {} files", report.staged.len());
    }
    println!("{} Refreshed", "✓".green());
    Ok(())
}
