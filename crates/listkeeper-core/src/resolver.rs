//! List resolution — which list does a command target?
//!
//! `add`, `remove`, and `view` all take an optional list name and delegate
//! here, so selection behaves identically across commands:
//!
//! 1. explicit name → that list, or `NotFound`
//! 2. no name, zero lists → `NoListsExist`
//! 3. no name, exactly one list → that list (auto-selection)
//! 4. no name, several lists → `AmbiguousSelection` (never guess)

use crate::error::ListError;
use crate::ScopeLists;

/// Resolve the target list name for an operation on `lists`.
pub fn resolve<'a>(lists: &'a ScopeLists, explicit: Option<&str>) -> Result<&'a str, ListError> {
    if let Some(name) = explicit {
        return match lists.get_key_value(name) {
            Some((key, _)) => Ok(key.as_str()),
            None => Err(ListError::NotFound(name.to_string())),
        };
    }

    let mut names = lists.keys();
    match (names.next(), names.next()) {
        (None, _) => Err(ListError::NoListsExist),
        (Some(only), None) => Ok(only.as_str()),
        (Some(_), Some(_)) => Err(ListError::AmbiguousSelection(
            lists.keys().cloned().collect(),
        )),
    }
}
