//! Apply a shelf to the working tree

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub async fn run(reference: &str, into: Option<&str>, remove: bool) -> Result<()> {
    // 1. Lock and open
    let (_lock, mut workspace) = util::lock_and_open()?;
    let root = workspace.layout().root().to_path_buf();

    // 2. Resolve shelf and target changelist
    let shelf = util::resolve_shelf(workspace.shelves(), reference)?.clone();
    let target = match into {
        Some(reference) => util::resolve_changelist(workspace.changelists(), reference)?.clone(),
        None => workspace.changelists_mut().get_active_changelist()?.clone(),
    };

    // 3. Apply
    let files = workspace
        .unshelve(&shelf.id, Some(&target.id), remove)
        .await
        .with_context(|| format!("Failed to unshelve '{}'", shelf.name))?;

    // 4. Display output
    println!(
        "{} Unshelved '{}' into '{}'",
        "✓".green(),
        shelf.name.yellow(),
        target.name.yellow()
    );
    for file in &files {
        println!("  {} {}", "+".green(), util::display_path(&root, file));
    }
    if remove {
        println!("  {}", "Shelf removed".dimmed());
    }
    Ok(())
}
