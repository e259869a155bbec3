//! Recovery of affected paths from unified-diff text

use ahash::AHashSet;

/// Paths touched by a patch, in order of first appearance.
///
/// Reads `+++ b/<path>` headers. A `/dev/null` target marks a deletion, in
/// which case the preceding `--- a/<path>` names the file. Quoted paths are
/// unquoted and each path is reported once.
pub fn affected_paths(patch: &str) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut out = Vec::new();

    // A header is a `---` line immediately followed by a `+++` line
    let lines: Vec<&str> = patch.lines().collect();
    for pair in lines.windows(2) {
        let (Some(old), Some(new)) = (pair[0].strip_prefix("--- "), pair[1].strip_prefix("+++ "))
        else {
            continue;
        };

        let path = header_path(new, "b/").or_else(|| header_path(old, "a/"));
        if let Some(path) = path {
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }

    out
}

/// Parses one side of a file header. `None` for `/dev/null`.
fn header_path(raw: &str, side_prefix: &str) -> Option<String> {
    // Timestamps after a tab are emitted by some diff tools
    let raw = raw.split('\t').next().unwrap_or(raw).trim_end();
    let unquoted = unquote(raw);

    if unquoted == "/dev/null" {
        return None;
    }

    let path = unquoted.strip_prefix(side_prefix).unwrap_or(&unquoted);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Strips surrounding quotes and undoes git's C-style escapes.
///
/// Octal escapes are bytes of the UTF-8 encoded name, so they are decoded
/// into a buffer first. A name that is not UTF-8 is returned as written.
fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut out = Vec::with_capacity(inner.len());
    let mut bytes = inner.bytes().peekable();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match bytes.next_if(|d| (b'0'..=b'7').contains(d)) {
                        Some(d) => value = value * 8 + u32::from(d - b'0'),
                        None => break,
                    }
                }
                out.push((value & 0xff) as u8);
            }
            Some(b'a') => out.push(0x07),
            Some(b'b') => out.push(0x08),
            Some(b'f') => out.push(0x0c),
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b't') => out.push(b'\t'),
            Some(b'v') => out.push(0x0b),
            Some(other) => out.push(other),
            None => out.push(b'\\'),
        }
    }

    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}
