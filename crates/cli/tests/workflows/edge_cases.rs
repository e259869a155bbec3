//! Error paths and degenerate inputs

use crate::cl;
use crate::common::TestRepo;
use crate::require_git;
use anyhow::Result;

#[test]
fn commands_require_initialized_workspace() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();

    let failed = cl!(&repo.root, "status").assert_failure()?;
    assert!(failed.contains_stderr("cl init"));
    cl!(&repo.root, "shelf", "list").assert_failure()?;
    Ok(())
}

#[test]
fn shelving_clean_changelist_records_nothing() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;

    let result = cl!(&repo.root, "shelve", "--name", "Empty").assert_success()?;
    assert!(result.contains_stdout("no changes to shelve"));
    assert!(repo.shelves().shelves().is_empty());

    let status = cl!(&repo.root, "status").assert_success()?;
    assert!(status.contains_stdout("(no changes)"));
    Ok(())
}

#[test]
fn unknown_references_fail() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;

    let failed = cl!(&repo.root, "unshelve", "missing").assert_failure()?;
    assert!(failed.contains_stderr("Unknown shelf"));

    let failed = cl!(&repo.root, "changelist", "activate", "missing").assert_failure()?;
    assert!(failed.contains_stderr("Unknown changelist"));

    let failed = cl!(&repo.root, "shelf", "show", "missing").assert_failure()?;
    assert!(failed.contains_stderr("Unknown shelf"));
    Ok(())
}

#[test]
fn changelist_reachable_by_id_prefix() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "changelist", "create", "Feature").assert_success()?;

    let id = repo.changelists().resolve("Feature").unwrap().id.clone();
    cl!(&repo.root, "changelist", "activate", &id[..10]).assert_success()?;

    let store = repo.changelists();
    assert_eq!(store.active_id(), Some(id.as_str()));
    Ok(())
}

#[test]
fn deleted_files_are_tracked_and_shelved() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;

    std::fs::remove_file(repo.path("src/lib.rs"))?;
    cl!(&repo.root, "refresh").assert_success()?;
    assert_eq!(repo.owner_of("src/lib.rs").as_deref(), Some("Default"));

    cl!(&repo.root, "shelve", "--name", "Removal").assert_success()?;
    assert!(repo.path("src/lib.rs").exists());

    cl!(&repo.root, "unshelve", "Removal").assert_success()?;
    assert!(!repo.path("src/lib.rs").exists());
    Ok(())
}
