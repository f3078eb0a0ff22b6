//! Storage backend — one durable record per scope.
//!
//! # Disk format
//!
//! Each scope (Discord channel) is a `.md` file under
//! `~/.listkeeper/records/`, holding every list in that scope:
//!
//! ```text
//! # groceries
//! - milk
//! - dark chocolate
//! # chores
//! ```
//!
//! A `# ` line opens a list, each following `- ` line is one item, and a
//! list with no item lines is empty. Names and items are escaped on write
//! (see `record`), so any string round-trips.

pub mod manager;
pub mod record;

pub use manager::ListStore;
