//! Show changelists and the files they hold

use crate::util;
use anyhow::{Context, Result};
use cl_core::{flatten, group_paths, FileStatus, GroupingOptions, TreeNode};
use journal::Changelist;
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub async fn run(flat: bool) -> Result<()> {
    // 1. Lock and open (status reconciles first)
    let (_lock, mut workspace) = util::lock_and_open()?;
    let root = workspace.layout().root().to_path_buf();

    // 2. Reconcile with the working tree
    workspace.refresh().await.context("Failed to refresh")?;

    // 3. Classify live changes for decoration
    let status = workspace.status().await.context("Failed to read status")?;
    let statuses = status.classify();
    let base_options = GroupingOptions {
        changelist_id: None,
        staged: status.staged.iter().cloned().collect(),
        statuses: statuses.clone(),
        expanded: workspace.settings().display.folders_expanded,
        root: Some(root.clone()),
    };

    // 4. Display output
    println!("{}", "Changelists".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for changelist in workspace.changelists().changelists() {
        println!();
        print_header(changelist);

        if changelist.files.is_empty() {
            println!("    {}", "(no changes)".dimmed());
            continue;
        }

        if flat {
            print_flat(&root, changelist, &statuses);
        } else {
            let options = GroupingOptions {
                changelist_id: Some(changelist.id.clone()),
                ..base_options.clone()
            };
            let tree = group_paths(&changelist.files, &options);
            for (depth, node) in flatten(&tree) {
                print_node(depth, node);
            }
        }
    }

    let shelf_count = workspace.shelves().shelves().len();
    if shelf_count > 0 {
        println!();
        println!(
            "{} {} shelved {}",
            "Shelves:".bold(),
            shelf_count,
            if shelf_count == 1 { "change" } else { "changes" }
        );
        println!("  {}", "Tip: List with 'cl shelf list'".dimmed());
    }

    Ok(())
}

fn print_header(changelist: &Changelist) {
    let marker = if changelist.active { "●".green().to_string() } else { "○".dimmed().to_string() };
    let count = match changelist.files.len() {
        1 => "1 file".to_string(),
        n => format!("{} files", n),
    };

    print!("{} {}", marker, changelist.name.bold());
    if changelist.active {
        print!(" {}", "(active)".green());
    }
    println!(
        "  {}  {}",
        format!("[{}]", count).dimmed(),
        util::short_id(&changelist.id).yellow()
    );

    if let Some(description) = &changelist.description {
        println!("    {}", description.dimmed());
    }
}

fn print_flat(root: &Path, changelist: &Changelist, statuses: &HashMap<PathBuf, FileStatus>) {
    for file in &changelist.files {
        let code = statuses.get(file).map(FileStatus::code).unwrap_or(' ');
        println!(
            "    {} {}",
            colorize_code(code),
            util::display_path(root, file)
        );
    }
}

fn print_node(depth: usize, node: &TreeNode) {
    let indent = "  ".repeat(depth + 2);
    match node {
        TreeNode::Folder {
            name,
            file_count,
            expanded,
            ..
        } => {
            let arrow = if *expanded { "▾" } else { "▸" };
            println!(
                "{}{} {}/ {}",
                indent,
                arrow,
                name.cyan(),
                format!("({})", file_count).dimmed()
            );
        }
        TreeNode::File {
            name,
            status,
            staged,
            ..
        } => {
            let code = status.map(|s| s.code()).unwrap_or(' ');
            let staged_mark = if *staged { " (staged)".dimmed().to_string() } else { String::new() };
            println!("{}{} {}{}", indent, colorize_code(code), name, staged_mark);
        }
    }
}

fn colorize_code(code: char) -> String {
    let code_str = code.to_string();
    match code {
        'M' => code_str.yellow().to_string(),
        'A' | '?' => code_str.green().to_string(),
        'D' => code_str.red().to_string(),
        'R' => code_str.cyan().to_string(),
        _ => code_str,
    }
}
