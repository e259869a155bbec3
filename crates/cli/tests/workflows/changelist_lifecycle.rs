//! Creating, activating, renaming and deleting changelists

use crate::cl;
use crate::common::TestRepo;
use crate::require_git;
use anyhow::Result;

#[test]
fn init_assigns_existing_changes_to_default() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");

    let result = cl!(&repo.root, "init").assert_success()?;
    assert!(result.contains_stdout("Initialized changelist workspace"));
    assert!(repo.path(".cl/changelists.json").exists());
    assert!(repo.path(".cl/config.toml").exists());

    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Default"));

    // Workspace metadata never shows up as a change
    let store = repo.changelists();
    let files: Vec<_> = store
        .changelists()
        .iter()
        .flat_map(|c| c.files.clone())
        .collect();
    assert_eq!(files, vec![repo.path("a.txt")]);

    // Second init is harmless
    let again = cl!(&repo.root, "init").assert_success()?;
    assert!(again.contains_stdout("already initialized"));
    Ok(())
}

#[test]
fn init_from_subdirectory_uses_repository_root() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();

    cl!(repo.path("src"), "init").assert_success()?;
    assert!(repo.path(".cl").is_dir());
    assert!(!repo.path("src/.cl").exists());

    // Commands work from anywhere below the root
    cl!(repo.path("src"), "changelist", "list").assert_success()?;
    Ok(())
}

#[test]
fn new_changes_land_in_active_changelist() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;

    let created =
        cl!(&repo.root, "changelist", "create", "Feature", "--activate").assert_success()?;
    assert!(created.contains_stdout("Feature"));

    repo.write("b.txt", "new\n");
    repo.write("src/lib.rs", "pub fn lib() { todo!() }\n");
    cl!(&repo.root, "refresh").assert_success()?;

    assert_eq!(repo.owner_of("b.txt").as_deref(), Some("Feature"));
    assert_eq!(repo.owner_of("src/lib.rs").as_deref(), Some("Feature"));

    let status = cl!(&repo.root, "status").assert_success()?;
    assert!(status.contains_stdout("Feature"));
    assert!(status.contains_stdout("b.txt"));
    assert!(status.contains_stdout("lib.rs"));

    let flat = cl!(&repo.root, "status", "--flat").assert_success()?;
    assert!(flat.contains_stdout("src/lib.rs"));
    Ok(())
}

#[test]
fn reverted_files_are_pruned() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "changed\n");
    cl!(&repo.root, "init").assert_success()?;
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Default"));

    repo.write("a.txt", "hello\n");
    cl!(&repo.root, "refresh").assert_success()?;
    assert_eq!(repo.owner_of("a.txt"), None);

    // Nothing left to do
    let result = cl!(&repo.root, "refresh").assert_success()?;
    assert!(result.contains_stdout("Up to date"));
    Ok(())
}

#[test]
fn move_between_changelists() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "changed\n");
    repo.write("b.txt", "new\n");
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "changelist", "create", "Feature").assert_success()?;

    cl!(&repo.root, "move", "a.txt", "--to", "Feature").assert_success()?;
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Feature"));
    assert_eq!(repo.owner_of("b.txt").as_deref(), Some("Default"));

    // Membership survives a refresh
    cl!(&repo.root, "refresh").assert_success()?;
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Feature"));

    let failed = cl!(&repo.root, "move", "a.txt", "--to", "Nope").assert_failure()?;
    assert!(failed.contains_stderr("Unknown changelist"));
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Feature"));
    Ok(())
}

#[test]
fn rename_and_describe() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "changelist", "create", "Feature").assert_success()?;

    cl!(&repo.root, "changelist", "rename", "Feature", "Bugfix").assert_success()?;
    cl!(&repo.root, "changelist", "describe", "Bugfix", "Fix the parser").assert_success()?;

    let store = repo.changelists();
    let bugfix = store.resolve("Bugfix").unwrap();
    assert_eq!(bugfix.description.as_deref(), Some("Fix the parser"));
    assert!(store.resolve("Feature").is_none());

    cl!(&repo.root, "changelist", "rename", "Bugfix", "   ").assert_failure()?;
    cl!(&repo.root, "changelist", "create", "").assert_failure()?;
    Ok(())
}

#[test]
fn delete_moves_files_and_keeps_one_changelist() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "changelist", "create", "Feature", "--activate").assert_success()?;

    repo.write("b.txt", "new\n");
    cl!(&repo.root, "refresh").assert_success()?;
    assert_eq!(repo.owner_of("b.txt").as_deref(), Some("Feature"));

    // Deleting the active changelist promotes another one and keeps its files
    cl!(&repo.root, "changelist", "delete", "Feature").assert_success()?;
    let store = repo.changelists();
    assert_eq!(store.changelists().len(), 1);
    assert_eq!(store.changelists()[0].name, "Default");
    assert!(store.changelists()[0].active);
    assert_eq!(repo.owner_of("b.txt").as_deref(), Some("Default"));

    let failed = cl!(&repo.root, "changelist", "delete", "Default").assert_failure()?;
    assert!(failed.contains_stderr("only changelist"));
    assert_eq!(repo.changelists().changelists().len(), 1);
    Ok(())
}
