//! Diffs for files git does not track yet

use similar::TextDiff;

/// Check if content is binary (contains null bytes in first 8KB)
pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

/// Builds a git-style patch creating `rel` with `content`.
///
/// The output applies with `git apply` and has the same shape as
/// `git diff` for a newly added file.
pub fn new_file_diff(rel: &str, content: &str, executable: bool) -> String {
    let mode = if executable { "100755" } else { "100644" };
    let mut out = format!("diff --git a/{rel} b/{rel}\nnew file mode {mode}\n");

    if content.is_empty() {
        return out;
    }

    let diff = TextDiff::from_lines("", content);
    let body = diff
        .unified_diff()
        .context_radius(3)
        .header("/dev/null", &format!("b/{rel}"))
        .to_string();
    out.push_str(&body);
    out
}
