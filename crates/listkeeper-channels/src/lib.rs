//! Listkeeper Channels — chat channel integrations.
//!
//! This crate provides:
//! - **base**: The `Channel` trait that all channel implementations must satisfy
//! - **manager**: `ChannelManager` — lifecycle orchestration and outbound message routing
//! - **discord** (feature `discord`): Discord gateway + slash commands

pub mod base;
pub mod manager;

#[cfg(feature = "discord")]
pub mod discord;

pub use base::Channel;
pub use manager::ChannelManager;
