//! Rendering — how lists are shown to the user.
//!
//! A list with zero items renders an explicit `(empty)` marker so that
//! "empty" and "nonexistent" are never ambiguous in the channel.

use crate::ScopeLists;

/// Render one list with its items.
pub fn render_list(name: &str, items: &[String]) -> String {
    let mut out = format!("**{}**", name);
    if items.is_empty() {
        out.push_str("\n_(empty)_");
    } else {
        for item in items {
            out.push_str("\n- ");
            out.push_str(item);
        }
    }
    out
}

/// Render every list in the scope, concatenated.
pub fn render_all(lists: &ScopeLists) -> String {
    lists
        .iter()
        .map(|(name, items)| render_list(name, items))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render just the list names, one per line.
pub fn render_names(lists: &ScopeLists) -> String {
    lists.keys().cloned().collect::<Vec<_>>().join("\n")
}
