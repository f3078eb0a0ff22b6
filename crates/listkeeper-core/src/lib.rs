//! Listkeeper core — everything the bot does apart from talking to Discord.
//!
//! - **bus**: async message bus between channels and the dispatch engine
//! - **config**: JSON config with env overrides
//! - **store**: per-scope durable records of named lists
//! - **resolver**: which list does an unnamed operation target?
//! - **commands**: the user-facing command table and its handlers
//! - **engine**: consumes the bus, runs handlers, persists, replies

pub mod bus;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod store;
pub mod utils;

pub use error::ListError;

/// All lists belonging to one scope, keyed by list name.
///
/// `BTreeMap` gives a deterministic (name-sorted) iteration order, so the
/// on-disk record layout is stable and save→load round-trips exactly.
pub type ScopeLists = std::collections::BTreeMap<String, Vec<String>>;
