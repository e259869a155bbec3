//! Shelve the changes of a changelist

use crate::{diff_utils, util};
use anyhow::{Context, Result};
use cl_core::Error;
use owo_colors::OwoColorize;

pub async fn run(
    changelist: Option<&str>,
    name: Option<&str>,
    description: Option<String>,
) -> Result<()> {
    // 1. Lock and open
    let (_lock, mut workspace) = util::lock_and_open()?;

    // 2. Pick up changes made since the last refresh
    workspace.refresh().await.context("Failed to refresh")?;

    // 3. Resolve the changelist (default: active)
    let source = match changelist {
        Some(reference) => util::resolve_changelist(workspace.changelists(), reference)?.clone(),
        None => workspace.changelists_mut().get_active_changelist()?.clone(),
    };
    if source.files.is_empty() {
        println!("{} '{}' has no changes to shelve", "•".yellow(), source.name);
        return Ok(());
    }

    // 4. Shelve and revert
    let name = match name {
        Some(name) => Some(util::validate_name(name)?),
        None => None,
    };
    let shelf = match workspace
        .shelve_changelist(&source.id, name.as_deref(), description)
        .await
    {
        Ok(shelf) => shelf,
        Err(Error::NothingToShelve) => {
            println!(
                "{} '{}' has no unstaged changes to shelve",
                "•".yellow(),
                source.name
            );
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to shelve changes"),
    };

    // 5. Display output
    let (added, removed) = diff_utils::line_stats(&shelf.patch);
    println!(
        "{} Shelved '{}' as '{}' ({})",
        "✓".green(),
        source.name,
        shelf.name.yellow(),
        util::short_id(&shelf.id).cyan()
    );
    println!(
        "  {} files, {} {}",
        shelf.files.len(),
        format!("+{}", added).green(),
        format!("-{}", removed).red()
    );
    println!(
        "  {}",
        format!("Tip: Restore with 'cl unshelve {}'", util::short_id(&shelf.id)).dimmed()
    );
    Ok(())
}
