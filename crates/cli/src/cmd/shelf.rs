//! Shelf management commands

use crate::{diff_utils, util};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// List shelves, newest first
pub async fn run_list() -> Result<()> {
    let workspace = util::open_workspace()?;

    let mut shelves: Vec<_> = workspace.shelves().shelves().iter().collect();
    shelves.sort_by(|a, b| b.date.cmp(&a.date));

    if shelves.is_empty() {
        println!("No shelved changes");
        return Ok(());
    }

    println!("{}", "Shelved Changes".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for shelf in shelves {
        let file_count = workspace
            .shelves()
            .affected_files(&shelf.id)
            .map(|files| files.len())
            .unwrap_or(0);
        println!(
            "{}  {:<24} {:>3} files  {}",
            util::short_id(&shelf.id).yellow(),
            shelf.name,
            file_count,
            util::format_relative_time(shelf.date).dimmed()
        );
    }

    Ok(())
}

/// Show a shelf's details and patch
pub async fn run_show(reference: &str, stat: bool) -> Result<()> {
    let workspace = util::open_workspace()?;
    let root = workspace.layout().root();

    // 1. Resolve reference
    let shelf = util::resolve_shelf(workspace.shelves(), reference)?;

    // 2. Gather details
    let patch = workspace.shelves().get_patch_content(&shelf.id)?;
    let files = workspace.shelves().affected_files(&shelf.id)?;
    let (added, removed) = diff_utils::line_stats(patch);

    // 3. Display output
    println!("{} {}", "Shelf".bold(), shelf.name.yellow());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("ID:          {}", shelf.id.cyan());
    println!(
        "Date:        {} ({})",
        util::format_relative_time(shelf.date),
        util::format_absolute_time(shelf.date).dimmed()
    );
    if let Some(description) = &shelf.description {
        println!("Description: {}", description);
    }
    println!(
        "Changes:     {} {}",
        format!("+{}", added).green(),
        format!("-{}", removed).red()
    );
    println!();
    println!("Files ({}):", files.len());
    for file in &files {
        println!("  {}", util::display_path(root, file));
    }

    if stat {
        return Ok(());
    }

    println!();
    if diff_utils::is_binary_patch(patch) {
        println!("{}", "(patch contains binary data)".dimmed());
    }
    print!("{}", diff_utils::colorize_patch(patch));
    Ok(())
}

/// Delete a shelf
pub async fn run_delete(reference: &str) -> Result<()> {
    let (_lock, mut workspace) = util::lock_and_open()?;

    let shelf = util::resolve_shelf(workspace.shelves(), reference)?.clone();
    workspace
        .shelves_mut()
        .delete_shelved_change(&shelf.id)
        .context("Failed to delete shelf")?;

    println!("{} Deleted shelf '{}'", "✓".green(), shelf.name.yellow());
    Ok(())
}

/// Export a shelf's patch to a file
pub async fn run_export(reference: &str, target: &Path) -> Result<()> {
    let workspace = util::open_workspace()?;

    let shelf = util::resolve_shelf(workspace.shelves(), reference)?;
    let target = util::absolute_path(target)?;
    workspace
        .shelves()
        .export_shelf(&shelf.id, &target)
        .with_context(|| format!("Failed to export shelf to {}", target.display()))?;

    println!(
        "{} Exported '{}' to {}",
        "✓".green(),
        shelf.name.yellow(),
        target.display()
    );
    Ok(())
}

/// Import a patch file as a new shelf
pub async fn run_import(source: &Path, name: &str, description: Option<String>) -> Result<()> {
    let name = util::validate_name(name)?;
    let source = util::absolute_path(source)?;
    let (_lock, mut workspace) = util::lock_and_open()?;

    let shelf = workspace
        .shelves_mut()
        .import_shelf(&source, &name, description)
        .with_context(|| format!("Failed to import {}", source.display()))?;

    println!(
        "{} Imported {} as shelf '{}' ({})",
        "✓".green(),
        source.display(),
        shelf.name.yellow(),
        util::short_id(&shelf.id).cyan()
    );
    Ok(())
}
