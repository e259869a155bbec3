//! Parser for `git status --porcelain -z`
//!
//! Each entry is `XY <path>` terminated by NUL. Renames and copies carry a
//! second NUL-terminated field with the source path:
//! ```text
//! R  new.rs\0old.rs\0
//! ```
//! `X` is the index state, `Y` the working tree state.

use cl_core::{Rename, StatusSnapshot};

pub fn parse_porcelain(output: &str) -> StatusSnapshot {
    let mut snapshot = StatusSnapshot::default();
    let mut fields = output.split('\0').filter(|f| !f.is_empty());

    while let Some(entry) = fields.next() {
        if entry.len() < 4 {
            continue;
        }
        let mut codes = entry.chars();
        let (Some(x), Some(y)) = (codes.next(), codes.next()) else {
            continue;
        };
        let path = entry[3..].to_string();

        match (x, y) {
            ('?', '?') => {
                snapshot.untracked.push(path);
                continue;
            }
            ('!', '!') => continue,
            _ => {}
        }

        if matches!(x, 'R' | 'C') {
            if let Some(from) = fields.next() {
                if x == 'R' {
                    snapshot.renamed.push(Rename {
                        from: from.to_string(),
                        to: path.clone(),
                    });
                }
            }
        }

        // Unmerged entries show up as modified
        let unmerged = x == 'U' || y == 'U' || (x == 'A' && y == 'A') || (x == 'D' && y == 'D');
        if unmerged {
            snapshot.modified.push(path);
            continue;
        }

        if matches!(x, 'M' | 'A' | 'D' | 'R' | 'C' | 'T') {
            snapshot.staged.push(path.clone());
        }
        if matches!(y, 'M' | 'T') {
            snapshot.modified.push(path.clone());
        }
        if x == 'D' || y == 'D' {
            snapshot.deleted.push(path);
        }
    }

    snapshot
}
