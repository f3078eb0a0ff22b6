//! Async message bus connecting channels ↔ engine.
//!
//! Uses tokio::sync::mpsc bounded channels.

use super::types::{InboundEvent, OutboundMessage};
use tokio::sync::mpsc;

/// The message bus.
///
/// - Channels publish to `inbound` (command invocations and plain text)
/// - The engine consumes from `inbound`, dispatches, publishes to `outbound`
/// - The channel manager consumes from `outbound` and routes to the channel
pub struct MessageBus {
    inbound_tx: mpsc::Sender<InboundEvent>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    outbound_tx: mpsc::Sender<OutboundMessage>,
    outbound_rx: tokio::sync::Mutex<mpsc::Receiver<OutboundMessage>>,
}

impl MessageBus {
    /// Create a new message bus with the given buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer_size);

        MessageBus {
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            outbound_tx,
            outbound_rx: tokio::sync::Mutex::new(outbound_rx),
        }
    }

    /// Publish an event from a channel to the engine (inbound).
    pub async fn publish_inbound(
        &self,
        event: InboundEvent,
    ) -> Result<(), mpsc::error::SendError<InboundEvent>> {
        self.inbound_tx.send(event).await
    }

    /// Consume the next inbound event (blocks until available).
    /// Returns None if all senders are dropped.
    pub async fn consume_inbound(&self) -> Option<InboundEvent> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await
    }

    /// Publish a response from the engine to a channel (outbound).
    pub async fn publish_outbound(
        &self,
        msg: OutboundMessage,
    ) -> Result<(), mpsc::error::SendError<OutboundMessage>> {
        self.outbound_tx.send(msg).await
    }

    /// Consume the next outbound message (blocks until available).
    /// Returns None if all senders are dropped.
    pub async fn consume_outbound(&self) -> Option<OutboundMessage> {
        let mut rx = self.outbound_rx.lock().await;
        rx.recv().await
    }

    /// Get a clone of the inbound sender (for channels to use).
    pub fn inbound_sender(&self) -> mpsc::Sender<InboundEvent> {
        self.inbound_tx.clone()
    }

    /// Get a clone of the outbound sender (for the engine to use).
    pub fn outbound_sender(&self) -> mpsc::Sender<OutboundMessage> {
        self.outbound_tx.clone()
    }
}
