//! The user-facing command surface.
//!
//! - **args**: quote-aware item tokenizer
//! - **render**: list rendering shared by view/show and mutation replies
//! - **handlers**: pure `(lists, args) → outcome` transformations
//! - **registry**: the explicit command table (name, schema, handler fn),
//!   built once and also used for slash-command registration

pub mod args;
pub mod handlers;
pub mod registry;
pub mod render;

pub use handlers::Outcome;
pub use registry::{command_table, find_command, ArgSpec, CommandSpec};
