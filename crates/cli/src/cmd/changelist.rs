//! Changelist management commands

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List every changelist
pub async fn run_list() -> Result<()> {
    let workspace = util::open_workspace()?;
    let changelists = workspace.changelists().changelists();

    println!("{}", "Changelists".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for changelist in changelists {
        let marker = if changelist.active { "●".green().to_string() } else { " ".to_string() };
        println!(
            "{} {}  {:<24} {}",
            marker,
            util::short_id(&changelist.id).yellow(),
            changelist.name,
            format!("{} files", changelist.files.len()).dimmed()
        );
        if let Some(description) = &changelist.description {
            println!("             {}", description.dimmed());
        }
    }

    Ok(())
}

/// Create a changelist
pub async fn run_create(name: &str, description: Option<String>, activate: bool) -> Result<()> {
    // 1. Validate input
    let name = util::validate_name(name)?;

    // 2. Lock and open
    let (_lock, mut workspace) = util::lock_and_open()?;

    // 3. Create (and optionally activate)
    let created = workspace
        .changelists_mut()
        .create_changelist(&name, description)
        .context("Failed to create changelist")?;
    if activate {
        workspace.changelists_mut().set_active_changelist(&created.id)?;
    }

    println!(
        "{} Created changelist '{}' ({}){}",
        "✓".green(),
        created.name.yellow(),
        util::short_id(&created.id).cyan(),
        if activate { " [active]" } else { "" }
    );
    Ok(())
}

/// Delete a changelist, moving its files into the active one
pub async fn run_delete(reference: &str) -> Result<()> {
    let (_lock, mut workspace) = util::lock_and_open()?;

    // 1. Resolve reference
    let target = util::resolve_changelist(workspace.changelists(), reference)?.clone();

    // 2. Delete (refused for the last changelist)
    if !workspace.changelists_mut().delete_changelist(&target.id)? {
        anyhow::bail!("Cannot delete '{}': it is the only changelist", target.name);
    }

    let active = workspace.changelists_mut().get_active_changelist()?.name.clone();
    println!("{} Deleted changelist '{}'", "✓".green(), target.name.yellow());
    if !target.files.is_empty() {
        println!(
            "  {} files moved to '{}'",
            target.files.len(),
            active.yellow()
        );
    }
    Ok(())
}

/// Make a changelist the active one
pub async fn run_activate(reference: &str) -> Result<()> {
    let (_lock, mut workspace) = util::lock_and_open()?;

    let target = util::resolve_changelist(workspace.changelists(), reference)?.clone();
    workspace.changelists_mut().set_active_changelist(&target.id)?;

    println!(
        "{} '{}' is now the active changelist",
        "✓".green(),
        target.name.yellow()
    );
    Ok(())
}

/// Rename a changelist
pub async fn run_rename(reference: &str, new_name: &str) -> Result<()> {
    let new_name = util::validate_name(new_name)?;
    let (_lock, mut workspace) = util::lock_and_open()?;

    let target = util::resolve_changelist(workspace.changelists(), reference)?.clone();
    workspace
        .changelists_mut()
        .rename_changelist(&target.id, &new_name)?;

    println!(
        "{} Renamed '{}' → '{}'",
        "✓".green(),
        target.name,
        new_name.yellow()
    );
    Ok(())
}

/// Set or clear a changelist description
pub async fn run_describe(reference: &str, description: Option<String>) -> Result<()> {
    let (_lock, mut workspace) = util::lock_and_open()?;

    let target = util::resolve_changelist(workspace.changelists(), reference)?.clone();
    let description = description.filter(|d| !d.trim().is_empty());
    let cleared = description.is_none();
    workspace
        .changelists_mut()
        .set_changelist_description(&target.id, description)?;

    if cleared {
        println!("{} Cleared description of '{}'", "✓".green(), target.name.yellow());
    } else {
        println!("{} Updated description of '{}'", "✓".green(), target.name.yellow());
    }
    Ok(())
}
