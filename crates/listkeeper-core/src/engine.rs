//! Dispatch engine — consumes the bus, runs command handlers, persists,
//! and replies.
//!
//! Each inbound event is handled in its own task, so invocations for
//! different scopes interleave freely; the per-scope lock from `ListStore`
//! serializes the load→mutate→save cycle within a scope.
//!
//! The engine also owns the delete-confirmation state: `/delete` arms a
//! pending entry keyed by (scope, sender), and the next plain message from
//! that sender in that scope either commits the deletion (`confirm`) or
//! cancels it. A background task cancels on timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::bus::{CommandInvocation, InboundEvent, MessageBus, OutboundMessage, TextMessage};
use crate::commands::registry::HandlerFn;
use crate::commands::{find_command, Outcome};
use crate::error::ListError;
use crate::store::ListStore;

/// The confirmation reply that commits an armed deletion.
const CONFIRM_WORD: &str = "confirm";

/// (scope, sender) — one pending deletion per user per channel.
type PendingKey = (String, String);

/// An armed deletion waiting for its confirmation reply.
struct PendingDelete {
    /// The list to delete once confirmed.
    list: String,
    /// Channel to send the timeout notice on.
    channel: String,
    /// Distinguishes this arming from a later re-arming of the same key,
    /// so a stale timeout task can't expire the newer one.
    generation: u64,
}

type PendingMap = Arc<Mutex<HashMap<PendingKey, PendingDelete>>>;

/// The dispatch engine.
pub struct Engine {
    bus: Arc<MessageBus>,
    store: Arc<ListStore>,
    confirm_timeout: Duration,
    pending: PendingMap,
    generation: AtomicU64,
}

impl Engine {
    /// Create a new engine.
    pub fn new(bus: Arc<MessageBus>, store: Arc<ListStore>, confirm_timeout: Duration) -> Self {
        Engine {
            bus,
            store,
            confirm_timeout,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Run until the bus closes. Spawns one task per inbound event.
    pub async fn run(self: Arc<Self>) {
        info!("engine started");
        while let Some(event) = self.bus.consume_inbound().await {
            let engine = self.clone();
            tokio::spawn(async move {
                match event {
                    InboundEvent::Command(inv) => engine.handle_command(inv).await,
                    InboundEvent::Text(msg) => engine.handle_text(msg).await,
                }
            });
        }
        info!("engine stopped (bus closed)");
    }

    /// Handle one slash-command invocation.
    async fn handle_command(&self, inv: CommandInvocation) {
        debug!(
            command = %inv.name,
            scope = %inv.chat_id,
            sender = %inv.sender_id,
            "dispatching command"
        );

        let Some(spec) = find_command(&inv.name) else {
            warn!(command = %inv.name, "unknown command");
            self.send(OutboundMessage::reply_to(
                &inv,
                format!("Unknown command \"{}\" — try /help.", inv.name),
            ))
            .await;
            return;
        };

        // Per-scope mutual exclusion around the whole read-modify-write.
        let guard = self.store.lock_scope(&inv.chat_id).await;
        let reply = match self.run_handler(spec.handler, &inv) {
            Ok(outcome) => {
                if let Some(list) = outcome.pending_delete.clone() {
                    self.arm_pending(&inv, list);
                }
                outcome.reply
            }
            Err(err) => {
                debug!(command = %inv.name, error = %err, "command failed");
                err.to_string()
            }
        };
        drop(guard);

        self.send(OutboundMessage::reply_to(&inv, reply)).await;
    }

    /// Load, run the handler, persist when dirty. Caller holds the scope lock.
    fn run_handler(
        &self,
        handler: HandlerFn,
        inv: &CommandInvocation,
    ) -> Result<Outcome, ListError> {
        let mut lists = self.store.load(&inv.chat_id)?;
        let outcome = handler(&mut lists, &inv.args)?;
        if outcome.dirty {
            self.store.save(&inv.chat_id, &lists)?;
        }
        Ok(outcome)
    }

    /// Arm a pending deletion and schedule its timeout.
    fn arm_pending(&self, inv: &CommandInvocation, list: String) {
        let key = (inv.chat_id.clone(), inv.sender_id.clone());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        {
            let mut pending = self.pending.lock().unwrap();
            // Re-arming replaces any earlier pending deletion for this user.
            pending.insert(
                key.clone(),
                PendingDelete {
                    list: list.clone(),
                    channel: inv.channel.clone(),
                    generation,
                },
            );
        }
        info!(scope = %key.0, sender = %key.1, list = %list, "armed delete confirmation");

        let bus = self.bus.clone();
        let pending = self.pending.clone();
        let timeout = self.confirm_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let expired = {
                let mut map = pending.lock().unwrap();
                match map.get(&key) {
                    Some(p) if p.generation == generation => map.remove(&key),
                    _ => None,
                }
            };

            if let Some(expired) = expired {
                info!(list = %expired.list, "delete confirmation timed out");
                let notice = OutboundMessage::new(
                    expired.channel,
                    key.0,
                    format!(
                        "Deletion of \"{}\" timed out — nothing was deleted.",
                        expired.list
                    ),
                );
                if let Err(e) = bus.publish_outbound(notice).await {
                    error!(error = %e, "failed to publish timeout notice");
                }
            }
        });
    }

    /// Handle a plain text message — only meaningful while a deletion is
    /// pending for its sender in its scope.
    async fn handle_text(&self, msg: TextMessage) {
        let key = (msg.chat_id.clone(), msg.sender_id.clone());
        let armed = {
            let mut pending = self.pending.lock().unwrap();
            pending.remove(&key)
        };
        let Some(armed) = armed else {
            return; // unrelated chatter
        };

        if !msg.content.trim().eq_ignore_ascii_case(CONFIRM_WORD) {
            info!(list = %armed.list, "delete confirmation mismatched, cancelling");
            self.send(OutboundMessage::new(
                msg.channel,
                msg.chat_id,
                ListError::Cancelled(armed.list).to_string(),
            ))
            .await;
            return;
        }

        let reply = match self.commit_delete(&msg.chat_id, &armed.list).await {
            Ok(true) => format!("Deleted list \"{}\".", armed.list),
            Ok(false) => format!("List \"{}\" was already gone.", armed.list),
            Err(err) => err.to_string(),
        };
        self.send(OutboundMessage::new(msg.channel, msg.chat_id, reply))
            .await;
    }

    /// Remove a list under the scope lock. Returns whether it existed.
    async fn commit_delete(&self, scope: &str, list: &str) -> Result<bool, ListError> {
        let _guard = self.store.lock_scope(scope).await;
        let mut lists = self.store.load(scope)?;
        let existed = lists.remove(list).is_some();
        if existed {
            self.store.save(scope, &lists)?;
            info!(scope, list, "deleted list");
        }
        Ok(existed)
    }

    async fn send(&self, msg: OutboundMessage) {
        if let Err(e) = self.bus.publish_outbound(msg).await {
            error!(error = %e, "failed to publish outbound message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Spin up an engine over a temp store; returns the bus to drive it.
    fn start_engine(confirm_timeout: Duration) -> (Arc<MessageBus>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let bus = Arc::new(MessageBus::new(32));
        let store = Arc::new(ListStore::new(Some(dir.path().to_path_buf())).unwrap());
        let engine = Arc::new(Engine::new(bus.clone(), store, confirm_timeout));
        tokio::spawn(engine.run());
        (bus, dir)
    }

    fn command(name: &str, args: &[(&str, &str)]) -> InboundEvent {
        let mut inv = CommandInvocation::new("discord", "user_1", "chan_1", name);
        for (k, v) in args {
            inv.args.insert(k.to_string(), v.to_string());
        }
        InboundEvent::Command(inv)
    }

    fn text(content: &str) -> InboundEvent {
        InboundEvent::Text(TextMessage::new("discord", "user_1", "chan_1", content))
    }

    async fn roundtrip(bus: &MessageBus, event: InboundEvent) -> String {
        bus.publish_inbound(event).await.unwrap();
        bus.consume_outbound().await.unwrap().content
    }

    #[tokio::test]
    async fn test_create_then_view() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        let reply = roundtrip(
            &bus,
            command("create", &[("name", "groceries"), ("items", "milk \"dark chocolate\"")]),
        )
        .await;
        assert!(reply.contains("groceries"));
        assert!(reply.contains("dark chocolate"));

        let reply = roundtrip(&bus, command("view", &[])).await;
        assert_eq!(reply, "**groceries**\n- milk\n- dark chocolate");
    }

    #[tokio::test]
    async fn test_add_without_name_is_ambiguous_with_two_lists() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        roundtrip(&bus, command("create", &[("name", "a")])).await;
        roundtrip(&bus, command("create", &[("name", "b")])).await;

        let reply = roundtrip(&bus, command("add", &[("items", "milk")])).await;
        assert!(reply.contains("name one"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));
        let reply = roundtrip(&bus, command("frobnicate", &[])).await;
        assert!(reply.contains("Unknown command"));
    }

    #[tokio::test]
    async fn test_error_becomes_user_message() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));
        let reply = roundtrip(&bus, command("view", &[])).await;
        assert!(reply.contains("no lists"));
    }

    #[tokio::test]
    async fn test_delete_confirm_flow() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        roundtrip(&bus, command("create", &[("name", "groceries")])).await;

        let prompt = roundtrip(&bus, command("delete", &[("name", "groceries")])).await;
        assert!(prompt.contains("confirm"));

        let reply = roundtrip(&bus, text("confirm")).await;
        assert_eq!(reply, "Deleted list \"groceries\".");

        let reply = roundtrip(&bus, command("lists", &[])).await;
        assert!(reply.contains("No lists"));
    }

    #[tokio::test]
    async fn test_delete_mismatch_cancels() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        roundtrip(&bus, command("create", &[("name", "groceries")])).await;
        roundtrip(&bus, command("delete", &[("name", "groceries")])).await;

        let reply = roundtrip(&bus, text("never mind")).await;
        assert!(reply.contains("cancelled"));

        // The list survives.
        let reply = roundtrip(&bus, command("lists", &[])).await;
        assert_eq!(reply, "groceries");
    }

    #[tokio::test]
    async fn test_delete_timeout_cancels() {
        let (bus, _dir) = start_engine(Duration::from_millis(50));

        roundtrip(&bus, command("create", &[("name", "groceries")])).await;
        roundtrip(&bus, command("delete", &[("name", "groceries")])).await;

        // No confirmation: the timeout task sends the cancellation notice.
        let notice = bus.consume_outbound().await.unwrap().content;
        assert!(notice.contains("timed out"));

        // A late "confirm" is ignored (no pending entry), so the next
        // outbound message is the reply to /lists — with the list intact.
        bus.publish_inbound(text("confirm")).await.unwrap();
        let reply = roundtrip(&bus, command("lists", &[])).await;
        assert_eq!(reply, "groceries");
    }

    #[tokio::test]
    async fn test_unrelated_text_is_ignored() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        bus.publish_inbound(text("just chatting")).await.unwrap();
        // Nothing pending, so no reply; the next outbound is the /help reply.
        let reply = roundtrip(&bus, command("help", &[])).await;
        assert!(reply.contains("Listkeeper"));
    }

    #[tokio::test]
    async fn test_remove_first_occurrence_end_to_end() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        roundtrip(
            &bus,
            command("create", &[("name", "groceries"), ("items", "milk milk")]),
        )
        .await;
        let reply = roundtrip(&bus, command("remove", &[("items", "milk")])).await;
        assert_eq!(reply, "**groceries**\n- milk");
    }

    #[tokio::test]
    async fn test_short_aliases_dispatch() {
        let (bus, _dir) = start_engine(Duration::from_secs(20));

        roundtrip(
            &bus,
            command("create", &[("name", "groceries"), ("items", "milk eggs")]),
        )
        .await;

        let reply = roundtrip(&bus, command("rm", &[("items", "eggs")])).await;
        assert_eq!(reply, "**groceries**\n- milk");

        let reply = roundtrip(&bus, command("ls", &[])).await;
        assert_eq!(reply, "groceries");
    }

    #[tokio::test]
    async fn test_state_survives_across_commands() {
        let (bus, dir) = start_engine(Duration::from_secs(20));

        roundtrip(&bus, command("create", &[("name", "groceries"), ("items", "milk")])).await;
        roundtrip(&bus, command("add", &[("items", "eggs")])).await;

        // A second store over the same directory sees the persisted state.
        let store = ListStore::new(Some(dir.path().to_path_buf())).unwrap();
        let lists = store.load("chan_1").unwrap();
        assert_eq!(lists["groceries"], vec!["milk", "eggs"]);
    }
}
