//! Record serialization — the line-oriented text format for one scope.
//!
//! `# <name>` opens a list block, `- <item>` adds an item to the current
//! block. Blocks appear in the mapping's iteration order (name-sorted for
//! `BTreeMap`), so output is deterministic.
//!
//! The marker prefixes are stripped positionally, so the only way content
//! could break the framing is an embedded line break. Names and items are
//! therefore escaped on write: `\` → `\\`, newline → `\n`, and carriage
//! return → `\r` (two characters each); reads invert. A bare `\r` would
//! otherwise be eaten by `lines()` when it precedes the terminator. This
//! makes save→load exact for any string.

use tracing::warn;

use crate::ScopeLists;

/// Prefix of a list-name line.
const LIST_MARKER: &str = "# ";

/// Prefix of an item line.
const ITEM_MARKER: &str = "- ";

/// Escape a name or item for a single record line.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Invert `escape`. Unknown escape sequences are kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Serialize all lists of one scope to the record text.
pub fn serialize_record(lists: &ScopeLists) -> String {
    let mut out = String::new();
    for (name, items) in lists {
        out.push_str(LIST_MARKER);
        out.push_str(&escape(name));
        out.push('\n');
        for item in items {
            out.push_str(ITEM_MARKER);
            out.push_str(&escape(item));
            out.push('\n');
        }
    }
    out
}

/// Parse a record text back into the scope's lists.
///
/// Recovery policy for malformed input: lines that are neither marker kind
/// are skipped, as are item lines appearing before the first name line.
/// Blank lines are ignored silently (hand-edited files tend to have them).
pub fn parse_record(text: &str) -> ScopeLists {
    let mut lists = ScopeLists::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(LIST_MARKER) {
            let name = unescape(rest);
            lists.entry(name.clone()).or_default();
            current = Some(name);
        } else if let Some(rest) = line.strip_prefix(ITEM_MARKER) {
            match current {
                Some(ref name) => {
                    if let Some(items) = lists.get_mut(name) {
                        items.push(unescape(rest));
                    }
                }
                None => warn!(line, "item line before any list marker, skipping"),
            }
        } else if line.trim().is_empty() {
            continue;
        } else {
            warn!(line, "unrecognized record line, skipping");
        }
    }

    lists
}
