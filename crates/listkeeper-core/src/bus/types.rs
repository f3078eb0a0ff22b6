//! Bus event types — what channels deliver to the engine and what the
//! engine sends back.
//!
//! A channel is a black box that delivers "command invoked with named
//! arguments" events and accepts "send text response" calls. Plain text
//! messages are also forwarded — the delete-confirmation step listens
//! for them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A slash-command invocation delivered by a channel.
#[derive(Clone, Debug)]
pub struct CommandInvocation {
    /// Channel name (e.g. "discord").
    pub channel: String,
    /// Sender identifier within the channel.
    pub sender_id: String,
    /// Conversation identifier — the scope that partitions lists.
    pub chat_id: String,
    /// Command name (e.g. "create", "add").
    pub name: String,
    /// Named arguments, all flattened to strings.
    pub args: HashMap<String, String>,
    /// When the invocation arrived.
    pub timestamp: DateTime<Utc>,
    /// Channel-specific metadata (e.g. interaction id/token), echoed back
    /// on the reply so the channel can route it.
    pub metadata: HashMap<String, String>,
}

impl CommandInvocation {
    /// Create a new invocation with minimal required fields.
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        CommandInvocation {
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            name: name.into(),
            args: HashMap::new(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Builder-style argument insertion, handy in tests.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Look up an argument by name.
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(|s| s.as_str())
    }
}

/// A plain (non-command) text message from a channel.
///
/// Only consulted while a delete confirmation is pending for its sender.
#[derive(Clone, Debug)]
pub struct TextMessage {
    pub channel: String,
    pub sender_id: String,
    pub chat_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TextMessage {
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        TextMessage {
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Anything a channel can deliver inbound.
#[derive(Clone, Debug)]
pub enum InboundEvent {
    Command(CommandInvocation),
    Text(TextMessage),
}

impl InboundEvent {
    /// The scope (conversation id) this event belongs to.
    pub fn chat_id(&self) -> &str {
        match self {
            InboundEvent::Command(c) => &c.chat_id,
            InboundEvent::Text(t) => &t.chat_id,
        }
    }

    /// The channel this event arrived on.
    pub fn channel(&self) -> &str {
        match self {
            InboundEvent::Command(c) => &c.channel,
            InboundEvent::Text(t) => &t.channel,
        }
    }
}

/// A response from the engine to a channel.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    /// Target channel name.
    pub channel: String,
    /// Target conversation identifier.
    pub chat_id: String,
    /// Text content to send.
    pub content: String,
    /// Channel-specific metadata (e.g. interaction token to answer).
    pub metadata: HashMap<String, String>,
}

impl OutboundMessage {
    /// Create a new outbound message.
    pub fn new(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        OutboundMessage {
            channel: channel.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Reply to an invocation, carrying its routing metadata back.
    pub fn reply_to(invocation: &CommandInvocation, content: impl Into<String>) -> Self {
        OutboundMessage {
            channel: invocation.channel.clone(),
            chat_id: invocation.chat_id.clone(),
            content: content.into(),
            metadata: invocation.metadata.clone(),
        }
    }
}
