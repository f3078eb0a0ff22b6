//! Command handlers — pure transformations of (scope's lists, arguments).
//!
//! Handlers never touch storage: the engine loads under the scope lock,
//! calls the handler from the registry table, and persists when `dirty`.
//! Errors bubble as `ListError` and become user-visible replies.

use std::collections::HashMap;

use super::args::tokenize_items;
use super::render;
use crate::error::ListError;
use crate::resolver::resolve;
use crate::ScopeLists;

/// Named arguments of one invocation, flattened to strings.
pub type Args = HashMap<String, String>;

/// What a handler produced.
#[derive(Debug)]
pub struct Outcome {
    /// Reply text for the user.
    pub reply: String,
    /// Whether the mutated mapping must be persisted.
    pub dirty: bool,
    /// Set by `delete`: the list name awaiting confirmation.
    pub pending_delete: Option<String>,
}

impl Outcome {
    fn reply(text: impl Into<String>) -> Self {
        Outcome {
            reply: text.into(),
            dirty: false,
            pending_delete: None,
        }
    }

    fn mutated(text: impl Into<String>) -> Self {
        Outcome {
            reply: text.into(),
            dirty: true,
            pending_delete: None,
        }
    }
}

fn required<'a>(args: &'a Args, key: &str, what: &str) -> Result<&'a str, ListError> {
    match args.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(v) => Ok(v),
        None => Err(ListError::InvalidArgument(format!("please give {}", what))),
    }
}

fn optional<'a>(args: &'a Args, key: &str) -> Option<&'a str> {
    args.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// `/create name [items]` — make a new list, optionally pre-filled.
pub fn create(lists: &mut ScopeLists, args: &Args) -> Result<Outcome, ListError> {
    let name = required(args, "name", "a name for the new list")?;
    if lists.contains_key(name) {
        return Err(ListError::AlreadyExists(name.to_string()));
    }

    let items = tokenize_items(args.get("items").map(|s| s.as_str()).unwrap_or(""));
    lists.insert(name.to_string(), items);
    Ok(Outcome::mutated(render::render_list(name, &lists[name])))
}

/// `/add items [list]` — append items to a list.
pub fn add(lists: &mut ScopeLists, args: &Args) -> Result<Outcome, ListError> {
    let raw = required(args, "items", "at least one item to add")?;
    let items = tokenize_items(raw);
    if items.is_empty() {
        return Err(ListError::InvalidArgument(
            "please give at least one item to add".into(),
        ));
    }

    let name = resolve(lists, optional(args, "list"))?.to_string();
    lists
        .get_mut(&name)
        .map(|existing| existing.extend(items))
        .ok_or_else(|| ListError::NotFound(name.clone()))?;
    Ok(Outcome::mutated(render::render_list(&name, &lists[&name])))
}

/// `/remove items [list]` — remove the first occurrence of each item.
///
/// Items not present are silently ignored; the record is persisted even if
/// nothing was actually removed.
pub fn remove(lists: &mut ScopeLists, args: &Args) -> Result<Outcome, ListError> {
    let raw = required(args, "items", "at least one item to remove")?;
    let items = tokenize_items(raw);
    if items.is_empty() {
        return Err(ListError::InvalidArgument(
            "please give at least one item to remove".into(),
        ));
    }

    let name = resolve(lists, optional(args, "list"))?.to_string();
    let entries = lists
        .get_mut(&name)
        .ok_or_else(|| ListError::NotFound(name.clone()))?;
    for item in &items {
        if let Some(pos) = entries.iter().position(|e| e == item) {
            entries.remove(pos);
        }
    }
    Ok(Outcome::mutated(render::render_list(&name, &lists[&name])))
}

/// `/delete name` — arm the confirmation step; the engine commits it.
pub fn delete(lists: &mut ScopeLists, args: &Args) -> Result<Outcome, ListError> {
    let name = required(args, "name", "the name of the list to delete")?;
    if !lists.contains_key(name) {
        return Err(ListError::NotFound(name.to_string()));
    }

    Ok(Outcome {
        reply: format!(
            "About to delete list \"{}\". Reply `confirm` here to proceed — anything else (or waiting) cancels.",
            name
        ),
        dirty: false,
        pending_delete: Some(name.to_string()),
    })
}

/// `/view [list]` — show one list; no mutation.
pub fn view(lists: &mut ScopeLists, args: &Args) -> Result<Outcome, ListError> {
    let name = resolve(lists, optional(args, "list"))?;
    Ok(Outcome::reply(render::render_list(name, &lists[name])))
}

/// `/lists` — just the list names.
pub fn list_names(lists: &mut ScopeLists, _args: &Args) -> Result<Outcome, ListError> {
    if lists.is_empty() {
        return Ok(Outcome::reply("No lists in this channel yet — try /create."));
    }
    Ok(Outcome::reply(render::render_names(lists)))
}

/// `/show` — every list with its items.
pub fn show_all(lists: &mut ScopeLists, _args: &Args) -> Result<Outcome, ListError> {
    if lists.is_empty() {
        return Ok(Outcome::reply("No lists in this channel yet — try /create."));
    }
    Ok(Outcome::reply(render::render_all(lists)))
}

/// `/help` — static usage text.
pub fn help(_lists: &mut ScopeLists, _args: &Args) -> Result<Outcome, ListError> {
    Ok(Outcome::reply(HELP_TEXT))
}

/// Usage text for `/help`.
pub const HELP_TEXT: &str = "\
**Listkeeper** — keeper of the lists
/create `name` `[items]` — make a new list, optionally pre-filled
/add `items` `[list]` — add items (quote multi-word items: \"dark chocolate\")
/remove `items` `[list]` — remove items (first match only)
/delete `name` — delete a list after confirmation
/view `[list]` — show one list
/lists — show list names
/show — show every list with its items
/rm and /ls are short for /remove and /lists.
When `[list]` is omitted and this channel has exactly one list, it is used \
automatically.";
