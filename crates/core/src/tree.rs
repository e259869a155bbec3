//! Hierarchical grouping of flat path lists for display
//!
//! Changelists store flat sets of absolute paths. Front ends want them as a
//! directory tree: folders first, then files, each kind sorted by name, with
//! every folder knowing how many files sit below it.

use crate::paths;
use crate::vcs::FileStatus;
use ahash::AHashSet;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};

/// Inputs that decorate the nodes produced by [`group_paths`].
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    /// Changelist that owns the grouped paths
    pub changelist_id: Option<String>,
    /// Paths currently staged in the index
    pub staged: AHashSet<PathBuf>,
    /// Per-path working tree status
    pub statuses: HashMap<PathBuf, FileStatus>,
    /// Whether folders start expanded
    pub expanded: bool,
    /// Display paths relative to this root when they lie inside it
    pub root: Option<PathBuf>,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            changelist_id: None,
            staged: AHashSet::new(),
            statuses: HashMap::new(),
            expanded: true,
            root: None,
        }
    }
}

/// Node of a grouped path tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Folder {
        name: String,
        path: PathBuf,
        /// Number of files anywhere below this folder
        file_count: usize,
        expanded: bool,
        changelist_id: Option<String>,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        path: PathBuf,
        status: Option<FileStatus>,
        staged: bool,
        changelist_id: Option<String>,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            TreeNode::Folder { path, .. } | TreeNode::File { path, .. } => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }

    /// Files at or below this node.
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::Folder { file_count, .. } => *file_count,
            TreeNode::File { .. } => 1,
        }
    }
}

#[derive(Default)]
struct DirEntry {
    path: PathBuf,
    dirs: BTreeMap<String, DirEntry>,
    files: BTreeMap<String, PathBuf>,
}

/// Groups `paths` into a folder/file tree.
///
/// Duplicate paths (by comparison key) are grouped once.
pub fn group_paths(files: &[PathBuf], options: &GroupingOptions) -> Vec<TreeNode> {
    let mut top = DirEntry::default();
    let mut seen = AHashSet::new();

    for path in files {
        if !seen.insert(paths::comparison_key(path)) {
            continue;
        }

        let (base, relative) = split_base(path, options.root.as_deref());
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let Some((file_name, folders)) = segments.split_last() else {
            continue;
        };

        let mut dir = &mut top;
        let mut folder_path = base;
        for segment in folders {
            folder_path.push(segment);
            let entry_path = folder_path.clone();
            dir = dir.dirs.entry(segment.clone()).or_insert_with(|| DirEntry {
                path: entry_path,
                ..DirEntry::default()
            });
        }
        dir.files.insert(file_name.clone(), paths::normalize(path));
    }

    emit(top, options)
}

/// Splits a path into the base it is displayed from and the remainder.
fn split_base(path: &Path, root: Option<&Path>) -> (PathBuf, PathBuf) {
    if let Some(root) = root {
        if let Some(rel) = paths::relative_to(root, path) {
            return (paths::normalize(root), rel);
        }
    }

    let normalized = paths::normalize(path);
    let mut base = PathBuf::new();
    let mut rest = PathBuf::new();
    for component in normalized.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => base.push(component.as_os_str()),
            other => rest.push(other.as_os_str()),
        }
    }
    (base, rest)
}

fn emit(dir: DirEntry, options: &GroupingOptions) -> Vec<TreeNode> {
    let mut folders: Vec<TreeNode> = dir
        .dirs
        .into_iter()
        .map(|(name, child)| {
            let path = child.path.clone();
            let children = emit(child, options);
            let file_count = children.iter().map(TreeNode::file_count).sum();
            TreeNode::Folder {
                name,
                path,
                file_count,
                expanded: options.expanded,
                changelist_id: options.changelist_id.clone(),
                children,
            }
        })
        .collect();

    let mut files: Vec<TreeNode> = dir
        .files
        .into_iter()
        .map(|(name, path)| TreeNode::File {
            status: options.statuses.get(&path).copied(),
            staged: options.staged.contains(&path),
            changelist_id: options.changelist_id.clone(),
            name,
            path,
        })
        .collect();

    folders.sort_by(display_order);
    files.sort_by(display_order);
    folders.extend(files);
    folders
}

fn display_order(a: &TreeNode, b: &TreeNode) -> std::cmp::Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.name().cmp(b.name()))
}

/// Depth-first `(depth, node)` pairs for line-oriented display.
///
/// Children of collapsed folders are not yielded.
pub fn flatten(nodes: &[TreeNode]) -> Vec<(usize, &TreeNode)> {
    fn walk<'a>(nodes: &'a [TreeNode], depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
        for node in nodes {
            out.push((depth, node));
            if let TreeNode::Folder {
                expanded: true,
                children,
                ..
            } = node
            {
                walk(children, depth + 1, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(nodes, 0, &mut out);
    out
}
