//! Reading and writing `.cl/config.toml` through the CLI

use crate::cl;
use crate::common::TestRepo;
use crate::require_git;
use anyhow::Result;
use std::process::Command;

#[test]
fn get_set_and_validate() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;

    let value = cl!(&repo.root, "config", "get", "reconcile.auto_stage").assert_success()?;
    assert_eq!(value.stdout.trim(), "false");

    cl!(&repo.root, "config", "set", "reconcile.auto_stage", "true").assert_success()?;
    let value = cl!(&repo.root, "config", "get", "reconcile.auto_stage").assert_success()?;
    assert_eq!(value.stdout.trim(), "true");

    // Rejected values leave the file untouched
    cl!(&repo.root, "config", "set", "reconcile.auto_stage", "maybe").assert_failure()?;
    cl!(&repo.root, "config", "set", "shelf.default_name", "").assert_failure()?;
    let unknown = cl!(&repo.root, "config", "get", "nope.key").assert_failure()?;
    assert!(unknown.contains_stderr("Unknown config key"));

    let value = cl!(&repo.root, "config", "get", "reconcile.auto_stage").assert_success()?;
    assert_eq!(value.stdout.trim(), "true");

    let listed = cl!(&repo.root, "config", "list").assert_success()?;
    assert!(listed.contains_stdout("auto_stage"));
    assert!(listed.contains_stdout("default_name"));

    let path = cl!(&repo.root, "config", "path").assert_success()?;
    assert!(path.stdout.trim().ends_with("config.toml"));
    Ok(())
}

#[test]
fn auto_stage_stages_new_assignments() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "config", "set", "reconcile.auto_stage", "true").assert_success()?;

    repo.write("b.txt", "new\n");
    cl!(&repo.root, "refresh").assert_success()?;

    let output = Command::new("git")
        .current_dir(&repo.root)
        .args(["diff", "--cached", "--name-only"])
        .output()?;
    let staged = String::from_utf8_lossy(&output.stdout);
    assert!(staged.lines().any(|l| l == "b.txt"));

    // Staged files stay assigned on later refreshes
    cl!(&repo.root, "refresh").assert_success()?;
    assert_eq!(repo.owner_of("b.txt").as_deref(), Some("Default"));
    Ok(())
}

#[test]
fn default_shelf_name_is_configurable() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "config", "set", "shelf.default_name", "Parked").assert_success()?;

    cl!(&repo.root, "shelve").assert_success()?;
    assert_eq!(repo.shelves().shelves()[0].name, "Parked");
    Ok(())
}

#[test]
fn example_config_is_printed() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    let example = cl!(&repo.root, "config", "example").assert_success()?;
    assert!(example.contains_stdout("[reconcile]"));
    assert!(example.contains_stdout("auto_stage = false"));
    Ok(())
}
