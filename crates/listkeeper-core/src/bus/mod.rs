//! Message bus — events flowing between chat channels and the engine.

pub mod queue;
pub mod types;

pub use queue::MessageBus;
pub use types::{CommandInvocation, InboundEvent, OutboundMessage, TextMessage};
