//! The command table — name, description, argument schema, handler.
//!
//! One explicit table instead of scattered callback registration: the
//! engine dispatches from it, and the Discord channel derives its
//! slash-command registration payload from the same entries.

use super::handlers::{self, Args, Outcome};
use crate::error::ListError;
use crate::ScopeLists;

/// Handler function shape shared by every command.
pub type HandlerFn = fn(&mut ScopeLists, &Args) -> Result<Outcome, ListError>;

/// Schema of one named argument.
#[derive(Clone, Copy, Debug)]
pub struct ArgSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// One entry of the command table.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [ArgSpec],
    pub handler: HandlerFn,
}

const NAME_ARG: ArgSpec = ArgSpec {
    name: "name",
    description: "Name of the list",
    required: true,
};

const ITEMS_REQUIRED: ArgSpec = ArgSpec {
    name: "items",
    description: "Items, space-separated; quote multi-word items",
    required: true,
};

const ITEMS_OPTIONAL: ArgSpec = ArgSpec {
    name: "items",
    description: "Initial items, space-separated; quote multi-word items",
    required: false,
};

const LIST_OPTIONAL: ArgSpec = ArgSpec {
    name: "list",
    description: "Which list (optional if this channel has exactly one)",
    required: false,
};

/// The full command table. Order here is the order shown to Discord.
pub fn command_table() -> &'static [CommandSpec] {
    &[
        CommandSpec {
            name: "create",
            description: "Make a new list in this channel",
            options: &[NAME_ARG, ITEMS_OPTIONAL],
            handler: handlers::create,
        },
        CommandSpec {
            name: "add",
            description: "Add items to a list",
            options: &[ITEMS_REQUIRED, LIST_OPTIONAL],
            handler: handlers::add,
        },
        CommandSpec {
            name: "remove",
            description: "Remove items from a list (first match only)",
            options: &[ITEMS_REQUIRED, LIST_OPTIONAL],
            handler: handlers::remove,
        },
        CommandSpec {
            name: "rm",
            description: "Short for /remove",
            options: &[ITEMS_REQUIRED, LIST_OPTIONAL],
            handler: handlers::remove,
        },
        CommandSpec {
            name: "delete",
            description: "Delete a whole list (asks for confirmation)",
            options: &[NAME_ARG],
            handler: handlers::delete,
        },
        CommandSpec {
            name: "view",
            description: "Show one list",
            options: &[LIST_OPTIONAL],
            handler: handlers::view,
        },
        CommandSpec {
            name: "lists",
            description: "Show the names of every list here",
            options: &[],
            handler: handlers::list_names,
        },
        CommandSpec {
            name: "ls",
            description: "Short for /lists",
            options: &[],
            handler: handlers::list_names,
        },
        CommandSpec {
            name: "show",
            description: "Show every list here with its items",
            options: &[],
            handler: handlers::show_all,
        },
        CommandSpec {
            name: "help",
            description: "How to use Listkeeper",
            options: &[],
            handler: handlers::help,
        },
    ]
}

/// Look up a command by name.
pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    command_table().iter().find(|spec| spec.name == name)
}
