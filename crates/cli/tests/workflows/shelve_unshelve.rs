//! Shelving changelists and restoring shelves

use crate::cl;
use crate::common::TestRepo;
use crate::require_git;
use anyhow::Result;

#[test]
fn shelve_then_unshelve_restores_working_tree() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");
    repo.write("b.txt", "new\n");
    cl!(&repo.root, "init").assert_success()?;

    // 1. Shelve the default changelist
    let shelved = cl!(&repo.root, "shelve", "--name", "WIP").assert_success()?;
    assert!(shelved.contains_stdout("WIP"));

    assert_eq!(repo.read("a.txt").as_deref(), Some("hello\n"));
    assert_eq!(repo.read("b.txt"), None);
    assert_eq!(repo.owner_of("a.txt"), None);

    let shelves = repo.shelves();
    assert_eq!(shelves.shelves().len(), 1);
    let shelf = &shelves.shelves()[0];
    assert_eq!(shelf.name, "WIP");
    assert!(repo.path(&format!(".cl/shelves/{}.patch", shelf.id)).exists());

    // 2. Inspect it
    let listed = cl!(&repo.root, "shelf", "list").assert_success()?;
    assert!(listed.contains_stdout("WIP"));

    let shown = cl!(&repo.root, "shelf", "show", "WIP").assert_success()?;
    assert!(shown.contains_stdout("+hello world"));
    assert!(shown.contains_stdout("b.txt"));

    // 3. Restore and drop the shelf
    cl!(&repo.root, "unshelve", "WIP", "--remove").assert_success()?;
    assert_eq!(repo.read("a.txt").as_deref(), Some("hello world\n"));
    assert_eq!(repo.read("b.txt").as_deref(), Some("new\n"));
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Default"));
    assert_eq!(repo.owner_of("b.txt").as_deref(), Some("Default"));
    assert!(repo.shelves().shelves().is_empty());

    let listed = cl!(&repo.root, "shelf", "list").assert_success()?;
    assert!(listed.contains_stdout("No shelved changes"));
    Ok(())
}

#[test]
fn shelve_one_changelist_leaves_others_alone() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");
    repo.write("src/lib.rs", "pub fn lib() { todo!() }\n");
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "changelist", "create", "Feature").assert_success()?;
    cl!(&repo.root, "move", "src/lib.rs", "--to", "Feature").assert_success()?;

    cl!(&repo.root, "shelve", "Feature").assert_success()?;

    assert_eq!(repo.read("src/lib.rs").as_deref(), Some("pub fn lib() {}\n"));
    assert_eq!(repo.read("a.txt").as_deref(), Some("hello world\n"));
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Default"));

    // Unnamed shelves take the configured default name
    let shelves = repo.shelves();
    assert_eq!(shelves.shelves()[0].name, "Shelved changes");
    Ok(())
}

#[test]
fn unshelve_into_named_changelist_keeps_shelf() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "shelve", "--name", "WIP").assert_success()?;
    cl!(&repo.root, "changelist", "create", "Later").assert_success()?;

    cl!(&repo.root, "unshelve", "WIP", "--into", "Later").assert_success()?;
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Later"));
    assert_eq!(repo.shelves().shelves().len(), 1);
    Ok(())
}

#[test]
fn conflicting_unshelve_fails_and_keeps_shelf() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "shelve", "--name", "WIP").assert_success()?;

    // The base moved on: the shelved hunk no longer applies
    repo.write("a.txt", "something else\n");
    let failed = cl!(&repo.root, "unshelve", "WIP", "--remove").assert_failure()?;
    assert!(failed.contains_stderr("Failed to unshelve"));

    assert_eq!(repo.read("a.txt").as_deref(), Some("something else\n"));
    assert_eq!(repo.shelves().shelves().len(), 1);

    let leftovers: Vec<_> = std::fs::read_dir(&repo.root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".cl-unshelve-"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[test]
fn export_delete_import_round_trip() -> Result<()> {
    require_git!();
    let repo = TestRepo::new();
    repo.write("a.txt", "hello world\n");
    cl!(&repo.root, "init").assert_success()?;
    cl!(&repo.root, "shelve", "--name", "WIP").assert_success()?;

    let export_dir = tempfile::TempDir::new()?;
    let exported = export_dir.path().join("wip.patch");
    let exported_arg = exported.to_string_lossy().to_string();
    let exported_arg = exported_arg.as_str();

    cl!(&repo.root, "shelf", "export", "WIP", exported_arg).assert_success()?;
    assert!(std::fs::read_to_string(&exported)?.contains("+hello world"));

    cl!(&repo.root, "shelf", "delete", "WIP").assert_success()?;
    assert!(repo.shelves().shelves().is_empty());

    cl!(&repo.root, "shelf", "import", exported_arg, "--name", "Imported").assert_success()?;
    let shelves = repo.shelves();
    assert_eq!(shelves.shelves().len(), 1);
    assert!(shelves.shelves()[0].files.is_empty());

    // Affected files come from the patch headers
    cl!(&repo.root, "unshelve", "Imported").assert_success()?;
    assert_eq!(repo.read("a.txt").as_deref(), Some("hello world\n"));
    assert_eq!(repo.owner_of("a.txt").as_deref(), Some("Default"));
    Ok(())
}
