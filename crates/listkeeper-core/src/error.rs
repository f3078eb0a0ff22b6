//! Error taxonomy for list operations.
//!
//! Every variant is recovered at the engine boundary and turned into a
//! user-visible message; none of these abort the process. The `Display`
//! text is what the user sees in the channel.

use thiserror::Error;

/// Why a list operation could not be completed.
#[derive(Debug, Error)]
pub enum ListError {
    /// A list was named explicitly but doesn't exist in this scope.
    #[error("list \"{0}\" does not exist here")]
    NotFound(String),

    /// `create` collided with an existing list name.
    #[error("list \"{0}\" already exists here")]
    AlreadyExists(String),

    /// No list was named and the scope has none at all.
    #[error("there are no lists in this channel yet — try /create")]
    NoListsExist,

    /// No list was named and the scope has several; the resolver never guesses.
    #[error("several lists exist here ({}) — please name one", .0.join(", "))]
    AmbiguousSelection(Vec<String>),

    /// A required argument was missing or empty.
    #[error("{0}")]
    InvalidArgument(String),

    /// Delete confirmation timed out or the reply didn't match.
    #[error("deletion cancelled — \"{0}\" was not touched")]
    Cancelled(String),

    /// The record file could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ListError::NotFound("groceries".into());
        assert_eq!(err.to_string(), "list \"groceries\" does not exist here");
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let err = ListError::AmbiguousSelection(vec!["a".into(), "b".into()]);
        let msg = err.to_string();
        assert!(msg.contains("a, b"));
        assert!(msg.contains("name one"));
    }

    #[test]
    fn test_storage_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: ListError = io.into();
        assert!(matches!(err, ListError::Storage(_)));
    }
}
