//! In-memory `Vcs` used by the store and reconcile tests
//!
//! Files hold a single line of content. Diffs and patches use the same
//! single-hunk shape git produces for such files, so patches written by
//! `diff` can be applied back with `apply_patch_file`.

use async_trait::async_trait;
use cl_core::{paths, Error, Rename, Result, StatusSnapshot, Vcs};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
struct FakeFile {
    head: Option<String>,
    worktree: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, FakeFile>,
    staged: Vec<String>,
    renamed: Vec<Rename>,
    fail_reverts: bool,
    fail_apply: bool,
    consume_patches: bool,
    applied: usize,
    stage_calls: Vec<Vec<String>>,
}

pub struct FakeVcs {
    root: PathBuf,
    state: Mutex<State>,
}

impl FakeVcs {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            state: Mutex::new(State::default()),
        }
    }

    fn rel(&self, path: &Path) -> String {
        paths::relative_to(&self.root, path)
            .map(|p| paths::to_slash(&p))
            .unwrap_or_else(|| paths::to_slash(path))
    }

    pub fn set_modified(&self, rel: &str, head: &str, worktree: &str) {
        self.state.lock().files.insert(
            rel.to_string(),
            FakeFile {
                head: Some(head.to_string()),
                worktree: Some(worktree.to_string()),
            },
        );
    }

    pub fn set_untracked(&self, rel: &str, content: &str) {
        self.state.lock().files.insert(
            rel.to_string(),
            FakeFile {
                head: None,
                worktree: Some(content.to_string()),
            },
        );
    }

    pub fn set_deleted(&self, rel: &str, head: &str) {
        self.state.lock().files.insert(
            rel.to_string(),
            FakeFile {
                head: Some(head.to_string()),
                worktree: None,
            },
        );
    }

    /// Drops every change to `rel`, as if it was committed or discarded.
    pub fn clean(&self, rel: &str) {
        let mut state = self.state.lock();
        state.files.remove(rel);
        state.staged.retain(|s| s != rel);
    }

    pub fn set_staged(&self, rel: &str) {
        self.state.lock().staged.push(rel.to_string());
    }

    pub fn add_rename(&self, from: &str, to: &str) {
        self.state.lock().renamed.push(Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn fail_reverts(&self, fail: bool) {
        self.state.lock().fail_reverts = fail;
    }

    pub fn fail_apply(&self, fail: bool) {
        self.state.lock().fail_apply = fail;
    }

    /// Deletes the patch file after a successful apply.
    pub fn consume_patches(&self, consume: bool) {
        self.state.lock().consume_patches = consume;
    }

    /// Number of apply attempts so far.
    pub fn applied_patches(&self) -> usize {
        self.state.lock().applied
    }

    /// Paths passed to each `stage_files` call.
    pub fn stage_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().stage_calls.clone()
    }
}

fn file_diff(rel: &str, file: &FakeFile) -> String {
    match (&file.head, &file.worktree) {
        (Some(head), Some(work)) if head != work => format!(
            "diff --git a/{rel} b/{rel}\n--- a/{rel}\n+++ b/{rel}\n@@ -1 +1 @@\n-{head}\n+{work}\n"
        ),
        (None, Some(work)) => format!(
            "diff --git a/{rel} b/{rel}\nnew file mode 100644\n--- /dev/null\n+++ b/{rel}\n@@ -0,0 +1 @@\n+{work}\n"
        ),
        (Some(head), None) => format!(
            "diff --git a/{rel} b/{rel}\ndeleted file mode 100644\n--- a/{rel}\n+++ /dev/null\n@@ -1 +0,0 @@\n-{head}\n"
        ),
        _ => String::new(),
    }
}

/// One file section of a patch: path, expected old content, new content.
fn parse_patch(patch: &str) -> Vec<(String, Option<String>, Option<String>)> {
    let mut sections = Vec::new();
    for section in patch.split("diff --git ").filter(|s| !s.trim().is_empty()) {
        let mut path = None;
        let mut old = None;
        let mut new = None;
        for line in section.lines() {
            if let Some(p) = line.strip_prefix("+++ b/") {
                path = Some(p.to_string());
            } else if let Some(p) = line.strip_prefix("--- a/") {
                path.get_or_insert_with(|| p.to_string());
            } else if line.starts_with("+++ ") || line.starts_with("--- ") {
                continue;
            } else if let Some(content) = line.strip_prefix('-') {
                old = Some(content.to_string());
            } else if let Some(content) = line.strip_prefix('+') {
                new = Some(content.to_string());
            }
        }
        if let Some(path) = path {
            sections.push((path, old, new));
        }
    }
    sections
}

#[async_trait]
impl Vcs for FakeVcs {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn status(&self) -> Result<StatusSnapshot> {
        let state = self.state.lock();
        let mut snapshot = StatusSnapshot {
            staged: state.staged.clone(),
            renamed: state.renamed.clone(),
            ..StatusSnapshot::default()
        };
        for (rel, file) in &state.files {
            match (&file.head, &file.worktree) {
                (Some(head), Some(work)) if head != work => snapshot.modified.push(rel.clone()),
                (None, Some(_)) => snapshot.untracked.push(rel.clone()),
                (Some(_), None) => snapshot.deleted.push(rel.clone()),
                _ => {}
            }
        }
        Ok(snapshot)
    }

    async fn diff(&self, path: &Path, _staged: bool) -> Result<String> {
        let rel = self.rel(path);
        let state = self.state.lock();
        Ok(state
            .files
            .get(&rel)
            .map(|f| file_diff(&rel, f))
            .unwrap_or_default())
    }

    async fn stage_files(&self, files: &[PathBuf]) -> Result<()> {
        let rels: Vec<String> = files.iter().map(|p| self.rel(p)).collect();
        let mut state = self.state.lock();
        for rel in &rels {
            if !state.staged.contains(rel) {
                state.staged.push(rel.clone());
            }
        }
        state.stage_calls.push(rels);
        Ok(())
    }

    async fn revert_file(&self, path: &Path) -> Result<()> {
        let rel = self.rel(path);
        let mut state = self.state.lock();
        if state.fail_reverts {
            return Err(Error::CommandFailed {
                command: format!("git checkout -- {}", rel),
                details: "simulated failure".to_string(),
            });
        }
        let untracked = match state.files.get_mut(&rel) {
            Some(file) => match file.head.clone() {
                Some(head) => {
                    file.worktree = Some(head);
                    false
                }
                None => true,
            },
            None => false,
        };
        if untracked {
            state.files.remove(&rel);
        }
        Ok(())
    }

    async fn apply_patch_file(&self, patch: &Path) -> Result<()> {
        let content = std::fs::read_to_string(patch)
            .map_err(|e| Error::io(format!("reading {}", patch.display()), e))?;

        let mut state = self.state.lock();
        state.applied += 1;

        let conflict = |details: String| Error::CommandFailed {
            command: "git apply".to_string(),
            details,
        };

        if state.fail_apply {
            return Err(conflict("simulated failure".to_string()));
        }

        let sections = parse_patch(&content);
        if sections.is_empty() {
            return Err(conflict("no valid patches in input".to_string()));
        }

        // Check everything before touching anything, like git apply
        for (rel, old, _) in &sections {
            let applies = match (old, state.files.get(rel)) {
                // Files the fake has never seen are clean with the expected content
                (Some(_), None) => true,
                (Some(old), Some(file)) => file.worktree.as_deref() == Some(old.as_str()),
                (None, None) => true,
                (None, Some(file)) => file.worktree.is_none(),
            };
            if !applies {
                return Err(conflict(format!("patch does not apply: {}", rel)));
            }
        }

        for (rel, old, new) in sections {
            let head = state.files.get(&rel).and_then(|f| f.head.clone()).or(old);
            state.files.insert(rel, FakeFile { head, worktree: new });
        }
        if state.consume_patches {
            std::fs::remove_file(patch)
                .map_err(|e| Error::io(format!("removing {}", patch.display()), e))?;
        }
        Ok(())
    }
}
