//! Colored rendering of unified diffs

use owo_colors::OwoColorize;

/// Check if a patch carries binary hunks
pub fn is_binary_patch(patch: &str) -> bool {
    patch
        .lines()
        .any(|l| l == "GIT binary patch" || l.starts_with("Binary files "))
}

/// Render a unified diff with colored output
///
/// File headers are bold, hunk headers cyan, additions green, deletions red.
pub fn colorize_patch(patch: &str) -> String {
    let mut output = String::with_capacity(patch.len() + patch.len() / 4);

    for line in patch.lines() {
        let rendered = if line.starts_with("diff --git ")
            || line.starts_with("+++ ")
            || line.starts_with("--- ")
        {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('\\') {
            line.dimmed().to_string()
        } else {
            line.to_string()
        };
        output.push_str(&rendered);
        output.push('\n');
    }

    output
}

/// Count added and removed lines in a patch
///
/// Only hunk bodies are counted, so content lines that themselves start
/// with `-- ` or `++ ` are not mistaken for file headers.
pub fn line_stats(patch: &str) -> (usize, usize) {
    let mut added = 0;
    let mut removed = 0;
    // Lines still expected from the current hunk: (old side, new side)
    let mut remaining = (0usize, 0usize);

    for line in patch.lines() {
        if remaining == (0, 0) {
            if let Some(lengths) = hunk_lengths(line) {
                remaining = lengths;
            }
            continue;
        }

        match line.as_bytes().first() {
            Some(b'-') => {
                removed += 1;
                remaining.0 = remaining.0.saturating_sub(1);
            }
            Some(b'+') => {
                added += 1;
                remaining.1 = remaining.1.saturating_sub(1);
            }
            Some(b'\\') => {}
            _ => {
                remaining.0 = remaining.0.saturating_sub(1);
                remaining.1 = remaining.1.saturating_sub(1);
            }
        }
    }
    (added, removed)
}

/// Old and new line counts from a `@@ -a,b +c,d @@` header.
fn hunk_lengths(line: &str) -> Option<(usize, usize)> {
    let ranges = line.strip_prefix("@@ -")?;
    let (ranges, _) = ranges.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;

    let count = |range: &str| match range.split_once(',') {
        Some((_, n)) => n.parse().ok(),
        None => Some(1),
    };
    Some((count(old)?, count(new)?))
}
