//! Move files between changelists

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub async fn run(paths: &[PathBuf], to: &str) -> Result<()> {
    // 1. Lock and open
    let (_lock, mut workspace) = util::lock_and_open()?;
    let root = workspace.layout().root().to_path_buf();

    // 2. Resolve target
    let target = util::resolve_changelist(workspace.changelists(), to)?.clone();

    // 3. Move each path
    let mut moved = 0;
    for arg in paths {
        let path = util::absolute_path(arg)?;
        let shown = util::display_path(&root, &path);

        let from = workspace
            .changelists()
            .get_changelist_for_file(&path)
            .map(|c| (c.id.clone(), c.name.clone()));

        workspace
            .changelists_mut()
            .move_file_to_changelist(&path, &target.id)?;

        match from {
            Some((from_id, _)) if from_id == target.id => {
                println!("  {} {} (already in '{}')", "•".dimmed(), shown, target.name);
            }
            Some((_, from)) => {
                println!("  {} {}: {} → {}", "→".cyan(), shown, from, target.name.yellow());
                moved += 1;
            }
            None => {
                println!("  {} {} → {}", "+".green(), shown, target.name.yellow());
                moved += 1;
            }
        }
    }

    println!("{} Moved {} files to '{}'", "✓".green(), moved, target.name.yellow());
    Ok(())
}
