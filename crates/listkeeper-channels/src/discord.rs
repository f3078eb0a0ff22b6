//! Discord channel — raw Gateway WebSocket + REST API.
//!
//! Uses the raw Discord Gateway (WebSocket) for receiving events and the
//! REST API for sending. No heavy Discord library required.
//!
//! Features:
//! - Gateway v10 WebSocket with heartbeat + resume
//! - Slash-command registration from the core command table
//! - `INTERACTION_CREATE` → `CommandInvocation` (deferred callback, reply
//!   delivered via the followup webhook)
//! - `MESSAGE_CREATE` → `TextMessage` (feeds the delete-confirmation step)
//! - Allow-list by Discord user ID
//! - Message chunking for >2000 char responses
//! - Rate-limit retry (HTTP 429)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex, Notify};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use listkeeper_core::bus::{CommandInvocation, InboundEvent, MessageBus, OutboundMessage, TextMessage};
use listkeeper_core::commands::{command_table, CommandSpec};

use crate::base::Channel;

// ─────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────

/// Discord REST API base URL.
const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Default Gateway WebSocket URL.
const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Discord message length limit.
const DISCORD_MAX_LEN: usize = 2000;

/// Default intents: GUILDS(1) + GUILD_MESSAGES(512) + DMs(4096) + MESSAGE_CONTENT(32768).
/// Message content is needed so `confirm` replies reach the engine.
const DEFAULT_INTENTS: u64 = 1 + 512 + 4096 + 32768;

/// Interaction type: application command.
const INTERACTION_APPLICATION_COMMAND: u64 = 2;

/// Interaction callback type: deferred channel message. Acknowledges within
/// the 3-second interaction deadline; the real reply follows via webhook.
const CALLBACK_DEFERRED: u64 = 5;

/// Application command option type: STRING.
const OPTION_STRING: u64 = 3;

// Gateway opcodes
const OP_DISPATCH: u64 = 0;
const OP_HEARTBEAT: u64 = 1;
const OP_IDENTIFY: u64 = 2;
const OP_RESUME: u64 = 6;
const OP_RECONNECT: u64 = 7;
const OP_INVALID_SESSION: u64 = 9;
const OP_HELLO: u64 = 10;
const OP_HEARTBEAT_ACK: u64 = 11;

// ─────────────────────────────────────────────
// DiscordChannel
// ─────────────────────────────────────────────

/// Discord channel using raw Gateway WebSocket + REST API.
pub struct DiscordChannel {
    /// Bot token from the Discord Developer Portal.
    token: String,
    /// Application id — used for command registration and followup webhooks.
    application_id: String,
    /// Message bus for inbound/outbound.
    bus: Arc<MessageBus>,
    /// Allow-list of Discord user IDs. Empty = allow everyone.
    allowed_users: Vec<String>,
    /// Gateway WebSocket URL.
    gateway_url: String,
    /// Gateway intents bitmask.
    intents: u64,
    /// Shutdown signal.
    shutdown: Arc<Notify>,
    /// HTTP client for REST API calls.
    http: reqwest::Client,
    /// Gateway sequence number for heartbeats.
    seq: Arc<Mutex<Option<u64>>>,
    /// Whether last heartbeat was ACKed (zombie detection).
    heartbeat_acked: Arc<Mutex<bool>>,
    /// Session ID for resume.
    session_id: Arc<Mutex<Option<String>>>,
    /// Resume gateway URL.
    resume_url: Arc<Mutex<Option<String>>>,
}

impl DiscordChannel {
    /// Create a new Discord channel.
    pub fn new(
        token: String,
        application_id: String,
        bus: Arc<MessageBus>,
        allowed_users: Vec<String>,
    ) -> Self {
        Self {
            token,
            application_id,
            bus,
            allowed_users,
            gateway_url: DEFAULT_GATEWAY_URL.into(),
            intents: DEFAULT_INTENTS,
            shutdown: Arc::new(Notify::new()),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to create HTTP client"),
            seq: Arc::new(Mutex::new(None)),
            heartbeat_acked: Arc::new(Mutex::new(true)),
            session_id: Arc::new(Mutex::new(None)),
            resume_url: Arc::new(Mutex::new(None)),
        }
    }

    /// Check if a sender is allowed.
    fn is_allowed(&self, sender_id: &str) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.iter().any(|u| u == sender_id)
    }

    /// Register the slash-command table with Discord (bulk overwrite).
    async fn register_commands(&self) -> anyhow::Result<()> {
        let url = format!(
            "{DISCORD_API_BASE}/applications/{}/commands",
            self.application_id
        );
        let payload = commands_payload(command_table());

        let resp = self
            .http
            .put(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "slash-command registration failed (HTTP {status}): {body}"
            ));
        }

        info!(commands = command_table().len(), "registered slash commands");
        Ok(())
    }

    /// Run the Gateway WebSocket connection with auto-reconnect.
    async fn run_gateway(&self) -> anyhow::Result<()> {
        loop {
            match self.gateway_session().await {
                Ok(()) => {
                    info!("discord gateway session ended normally");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "discord gateway error, reconnecting in 5s");
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_secs(5)) => {}
                        _ = self.shutdown.notified() => {
                            info!("discord shutdown during reconnect wait");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Single Gateway WebSocket session: HELLO → IDENTIFY/RESUME → events.
    async fn gateway_session(&self) -> anyhow::Result<()> {
        // Decide URL: resume URL or default
        let url = {
            let resume = self.resume_url.lock().await;
            resume.as_deref().unwrap_or(&self.gateway_url).to_string()
        };

        debug!(url = %url, "connecting to discord gateway");
        let (ws_stream, _) = tokio_tungstenite::connect_async(&url).await?;
        let (mut write, mut read) = ws_stream.split();

        // Single writer task: heartbeats and identify frames both go
        // through this queue so the write half has one owner.
        let (ws_tx, mut ws_rx) = mpsc::channel::<String>(16);
        let writer = tokio::spawn(async move {
            while let Some(frame) = ws_rx.recv().await {
                if let Err(e) = write.send(WsMessage::text(frame)).await {
                    warn!(error = %e, "discord ws write error");
                    break;
                }
            }
            let _ = write.send(WsMessage::Close(None)).await;
        });

        let mut heartbeat_handle: Option<tokio::task::JoinHandle<()>> = None;

        let result = loop {
            tokio::select! {
                msg = read.next() => {
                    let msg = match msg {
                        Some(Ok(m)) => m,
                        Some(Err(e)) => break Err(anyhow::anyhow!("ws read error: {e}")),
                        None => break Err(anyhow::anyhow!("ws stream ended")),
                    };

                    let text = match msg {
                        WsMessage::Text(t) => t.to_string(),
                        WsMessage::Close(frame) => {
                            info!(?frame, "discord ws closed by server");
                            break Err(anyhow::anyhow!("ws closed by server"));
                        }
                        _ => continue,
                    };

                    let payload: Value = match serde_json::from_str(&text) {
                        Ok(v) => v,
                        Err(e) => {
                            warn!(error = %e, "discord ws invalid json");
                            continue;
                        }
                    };

                    if let Some(s) = payload["s"].as_u64() {
                        *self.seq.lock().await = Some(s);
                    }

                    match payload["op"].as_u64().unwrap_or(0) {
                        OP_HELLO => {
                            let interval = payload["d"]["heartbeat_interval"]
                                .as_u64()
                                .unwrap_or(41250);
                            debug!(interval_ms = interval, "discord HELLO received");

                            if let Some(h) = heartbeat_handle.take() {
                                h.abort();
                            }
                            heartbeat_handle =
                                Some(self.spawn_heartbeat(interval, ws_tx.clone()));

                            *self.heartbeat_acked.lock().await = true;
                            let frame = self.identify_or_resume_frame().await;
                            if ws_tx.send(frame).await.is_err() {
                                break Err(anyhow::anyhow!("ws writer gone"));
                            }
                        }

                        OP_DISPATCH => {
                            match payload["t"].as_str().unwrap_or("") {
                                "READY" => {
                                    if let Some(sid) = payload["d"]["session_id"].as_str() {
                                        *self.session_id.lock().await = Some(sid.to_string());
                                    }
                                    if let Some(url) =
                                        payload["d"]["resume_gateway_url"].as_str()
                                    {
                                        *self.resume_url.lock().await = Some(url.to_string());
                                    }
                                    let user = payload["d"]["user"]["username"]
                                        .as_str()
                                        .unwrap_or("unknown");
                                    info!(user = user, "discord bot READY");
                                }
                                "RESUMED" => {
                                    info!("discord session resumed");
                                }
                                "INTERACTION_CREATE" => {
                                    self.handle_interaction_create(&payload["d"]).await;
                                }
                                "MESSAGE_CREATE" => {
                                    self.handle_message_create(&payload["d"]).await;
                                }
                                event => {
                                    debug!(event, "discord event (unhandled)");
                                }
                            }
                        }

                        OP_HEARTBEAT_ACK => {
                            *self.heartbeat_acked.lock().await = true;
                        }

                        OP_HEARTBEAT => {
                            // Server requesting immediate heartbeat
                            let s = *self.seq.lock().await;
                            let hb = json!({"op": OP_HEARTBEAT, "d": s}).to_string();
                            let _ = ws_tx.send(hb).await;
                        }

                        OP_RECONNECT => {
                            info!("discord server requested reconnect");
                            break Err(anyhow::anyhow!("reconnect requested"));
                        }

                        OP_INVALID_SESSION => {
                            let resumable = payload["d"].as_bool().unwrap_or(false);
                            warn!(resumable, "discord invalid session");
                            if !resumable {
                                *self.session_id.lock().await = None;
                                *self.resume_url.lock().await = None;
                            }
                            break Err(anyhow::anyhow!("invalid session"));
                        }

                        _ => {}
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("discord shutdown signal received");
                    break Ok(());
                }
            }
        };

        if let Some(h) = heartbeat_handle {
            h.abort();
        }
        writer.abort();
        result
    }

    /// Spawn the heartbeat task; stops when a beat goes unACKed (zombie).
    fn spawn_heartbeat(
        &self,
        interval_ms: u64,
        ws_tx: mpsc::Sender<String>,
    ) -> tokio::task::JoinHandle<()> {
        let seq = self.seq.clone();
        let acked = self.heartbeat_acked.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            // Initial jitter
            let jitter = (interval_ms as f64 * rand_jitter()) as u64;
            tokio::time::sleep(Duration::from_millis(jitter)).await;

            loop {
                {
                    let mut acked = acked.lock().await;
                    if !*acked {
                        warn!("discord heartbeat not ACKed, requesting reconnect");
                        break;
                    }
                    *acked = false;
                }

                let s = *seq.lock().await;
                let hb = json!({"op": OP_HEARTBEAT, "d": s}).to_string();
                if ws_tx.send(hb).await.is_err() {
                    break;
                }

                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(interval_ms)) => {}
                    _ = shutdown.notified() => break,
                }
            }
        })
    }

    /// Build the IDENTIFY frame, or RESUME when a session is held.
    async fn identify_or_resume_frame(&self) -> String {
        let session = self.session_id.lock().await.clone();
        if let Some(sid) = session {
            let s = *self.seq.lock().await;
            json!({
                "op": OP_RESUME,
                "d": {
                    "token": self.token,
                    "session_id": sid,
                    "seq": s
                }
            })
            .to_string()
        } else {
            json!({
                "op": OP_IDENTIFY,
                "d": {
                    "token": self.token,
                    "intents": self.intents,
                    "properties": {
                        "os": "listkeeper",
                        "browser": "listkeeper",
                        "device": "listkeeper"
                    }
                }
            })
            .to_string()
        }
    }

    /// Handle an INTERACTION_CREATE event.
    async fn handle_interaction_create(&self, data: &Value) {
        let Some(inv) = parse_interaction(data) else {
            return;
        };

        if !self.is_allowed(&inv.sender_id) {
            warn!(
                sender = %inv.sender_id,
                channel = %inv.chat_id,
                "discord interaction from unauthorized user, ignoring"
            );
            return;
        }

        debug!(
            command = %inv.name,
            sender = %inv.sender_id,
            channel = %inv.chat_id,
            "discord interaction"
        );

        // Acknowledge within the 3s deadline so the engine's reply can be
        // delivered later via the followup webhook.
        if let (Some(id), Some(token)) = (
            inv.metadata.get("interaction_id").cloned(),
            inv.metadata.get("interaction_token").cloned(),
        ) {
            if let Err(e) = self.ack_interaction(&id, &token).await {
                warn!(error = %e, "failed to ack discord interaction");
            }
        }

        if let Err(e) = self.bus.publish_inbound(InboundEvent::Command(inv)).await {
            error!(error = %e, "failed to publish discord interaction to bus");
        }
    }

    /// Send the deferred-response callback for an interaction.
    async fn ack_interaction(&self, id: &str, token: &str) -> anyhow::Result<()> {
        let url = format!("{DISCORD_API_BASE}/interactions/{id}/{token}/callback");
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "type": CALLBACK_DEFERRED }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("interaction ack failed (HTTP {status}): {body}"));
        }
        Ok(())
    }

    /// Handle a MESSAGE_CREATE event — plain text feeds the confirmation step.
    async fn handle_message_create(&self, data: &Value) {
        // Ignore bot messages (including our own)
        if data["author"]["bot"].as_bool().unwrap_or(false) {
            return;
        }

        let (Some(sender_id), Some(channel_id)) = (
            data["author"]["id"].as_str(),
            data["channel_id"].as_str(),
        ) else {
            return;
        };

        if !self.is_allowed(sender_id) {
            return;
        }

        let content = data["content"].as_str().unwrap_or("");
        if content.is_empty() {
            return;
        }

        let msg = TextMessage::new("discord", sender_id, channel_id, content);
        if let Err(e) = self.bus.publish_inbound(InboundEvent::Text(msg)).await {
            error!(error = %e, "failed to publish discord message to bus");
        }
    }

    /// POST a JSON body with retry on rate-limit.
    async fn post_with_retry(&self, url: &str, body: &Value, authed: bool) -> anyhow::Result<()> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let mut req = self.http.post(url).json(body);
            if authed {
                req = req.header("Authorization", format!("Bot {}", self.token));
            }
            let resp = req.send().await?;
            let status = resp.status();

            if status.is_success() {
                return Ok(());
            }

            if status.as_u16() == 429 {
                let body_text = resp.text().await.unwrap_or_default();
                let retry_after: f64 = serde_json::from_str::<Value>(&body_text)
                    .ok()
                    .and_then(|v| v["retry_after"].as_f64())
                    .unwrap_or(1.0);
                warn!(retry_after_s = retry_after, attempt = attempts, "discord rate limited");
                tokio::time::sleep(Duration::from_secs_f64(retry_after)).await;
                continue;
            }

            if attempts >= 3 {
                let err_text = resp.text().await.unwrap_or_default();
                return Err(anyhow::anyhow!(
                    "discord send failed after 3 attempts (HTTP {status}): {err_text}"
                ));
            }

            warn!(status = %status, attempt = attempts, "discord send error, retrying in 1s");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}

/// Build the bulk-overwrite registration payload from the command table.
pub fn commands_payload(specs: &[CommandSpec]) -> Value {
    let commands: Vec<Value> = specs
        .iter()
        .map(|spec| {
            let options: Vec<Value> = spec
                .options
                .iter()
                .map(|opt| {
                    json!({
                        "type": OPTION_STRING,
                        "name": opt.name,
                        "description": opt.description,
                        "required": opt.required
                    })
                })
                .collect();
            json!({
                "name": spec.name,
                "description": spec.description,
                "options": options
            })
        })
        .collect();
    Value::Array(commands)
}

/// Extract a `CommandInvocation` from an INTERACTION_CREATE payload.
///
/// Returns `None` for anything that isn't an application command with the
/// fields we need. Interaction id + token land in metadata so the reply can
/// go out via the followup webhook.
pub fn parse_interaction(data: &Value) -> Option<CommandInvocation> {
    if data["type"].as_u64() != Some(INTERACTION_APPLICATION_COMMAND) {
        return None;
    }

    let name = data["data"]["name"].as_str()?;
    let channel_id = data["channel_id"].as_str()?;
    // Guild interactions nest the user under "member"; DMs use "user".
    let sender_id = data["member"]["user"]["id"]
        .as_str()
        .or_else(|| data["user"]["id"].as_str())?;

    let mut inv = CommandInvocation::new("discord", sender_id, channel_id, name);

    if let Some(options) = data["data"]["options"].as_array() {
        for opt in options {
            let Some(opt_name) = opt["name"].as_str() else {
                continue;
            };
            let value = match &opt["value"] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            inv.args.insert(opt_name.to_string(), value);
        }
    }

    if let Some(id) = data["id"].as_str() {
        inv.metadata.insert("interaction_id".into(), id.to_string());
    }
    if let Some(token) = data["token"].as_str() {
        inv.metadata
            .insert("interaction_token".into(), token.to_string());
    }

    Some(inv)
}

/// Split a message into chunks respecting Discord's 2000 char limit.
/// Tries to split at newline boundaries, never inside a UTF-8 character.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Byte max_len may fall inside a multi-byte character; back up to
        // the nearest boundary before looking for a newline.
        let mut limit = max_len;
        while !remaining.is_char_boundary(limit) {
            limit -= 1;
        }
        if limit == 0 {
            // A single character wider than the limit: emit it whole.
            limit = remaining
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(remaining.len());
            chunks.push(remaining[..limit].to_string());
            remaining = &remaining[limit..];
            continue;
        }

        let split_at = remaining[..limit]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(limit);

        chunks.push(remaining[..split_at].to_string());
        remaining = &remaining[split_at..];
    }

    chunks
}

/// Simple jitter: a random fraction between 0.0 and 1.0 for heartbeat.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos as f64) / 1_000_000_000.0
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> anyhow::Result<()> {
        if self.token.is_empty() {
            return Err(anyhow::anyhow!("discord token is empty"));
        }
        if self.application_id.is_empty() {
            return Err(anyhow::anyhow!("discord application id is empty"));
        }

        info!("starting discord channel (gateway v10)");
        self.register_commands().await?;
        self.run_gateway().await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        info!("stopping discord channel");
        self.shutdown.notify_waiters();
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
        let chunks = split_message(&msg.content, DISCORD_MAX_LEN);

        // A reply to an interaction goes through its followup webhook;
        // engine-initiated notices go to the channel directly.
        if let Some(token) = msg.metadata.get("interaction_token") {
            let url = format!(
                "{DISCORD_API_BASE}/webhooks/{}/{token}",
                self.application_id
            );
            for chunk in &chunks {
                self.post_with_retry(&url, &json!({ "content": chunk }), false)
                    .await?;
            }
        } else {
            let url = format!("{DISCORD_API_BASE}/channels/{}/messages", msg.chat_id);
            for chunk in &chunks {
                self.post_with_retry(&url, &json!({ "content": chunk }), true)
                    .await?;
            }
        }

        debug!(chat_id = %msg.chat_id, chunks = chunks.len(), "discord message sent");
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_channel() -> DiscordChannel {
        let bus = Arc::new(MessageBus::new(32));
        DiscordChannel::new("test_token".into(), "app_1".into(), bus, vec![])
    }

    fn create_restricted_channel() -> DiscordChannel {
        let bus = Arc::new(MessageBus::new(32));
        DiscordChannel::new(
            "test_token".into(),
            "app_1".into(),
            bus,
            vec!["123456789".into(), "987654321".into()],
        )
    }

    #[test]
    fn test_channel_name() {
        let ch = create_test_channel();
        assert_eq!(ch.name(), "discord");
    }

    #[test]
    fn test_is_allowed_empty_list() {
        let ch = create_test_channel();
        assert!(ch.is_allowed("anyone"));
    }

    #[test]
    fn test_is_allowed_by_id() {
        let ch = create_restricted_channel();
        assert!(ch.is_allowed("123456789"));
        assert!(!ch.is_allowed("000000000"));
    }

    #[test]
    fn test_split_message_short() {
        let chunks = split_message("hello", 2000);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_split_message_no_newline() {
        let msg = "x".repeat(2500);
        let chunks = split_message(&msg, 2000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 2000);
        assert_eq!(chunks[1].len(), 500);
    }

    #[test]
    fn test_split_message_multibyte_boundary() {
        // 667 three-byte chars = 2001 bytes; byte 2000 lands mid-character.
        let msg = "€".repeat(667);
        let chunks = split_message(&msg, 2000);
        assert_eq!(chunks.concat(), msg);
        for chunk in &chunks {
            assert!(chunk.len() <= 2000);
            assert!(chunk.chars().all(|c| c == '€'));
        }
    }

    #[test]
    fn test_split_message_tiny_limit_emits_whole_chars() {
        // A character wider than the limit must still come out intact.
        let chunks = split_message("€€", 2);
        assert_eq!(chunks, vec!["€", "€"]);
    }

    #[test]
    fn test_split_message_at_newline() {
        let mut msg = "x".repeat(1990);
        msg.push('\n');
        msg.push_str(&"y".repeat(500));
        let chunks = split_message(&msg, 2000);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].ends_with('\n'));
    }

    #[test]
    fn test_commands_payload_shape() {
        let payload = commands_payload(command_table());
        let commands = payload.as_array().unwrap();
        assert_eq!(commands.len(), command_table().len());

        let create = commands
            .iter()
            .find(|c| c["name"] == "create")
            .expect("create command registered");
        let options = create["options"].as_array().unwrap();
        assert_eq!(options[0]["name"], "name");
        assert_eq!(options[0]["required"], true);
        assert_eq!(options[0]["type"], 3); // STRING
        assert_eq!(options[1]["name"], "items");
        assert_eq!(options[1]["required"], false);
    }

    #[test]
    fn test_parse_interaction_guild_command() {
        let data = json!({
            "id": "int_1",
            "token": "tok_abc",
            "type": 2,
            "channel_id": "chan_9",
            "member": { "user": { "id": "user_7" } },
            "data": {
                "name": "add",
                "options": [
                    { "name": "items", "value": "milk eggs" },
                    { "name": "list", "value": "groceries" }
                ]
            }
        });

        let inv = parse_interaction(&data).unwrap();
        assert_eq!(inv.name, "add");
        assert_eq!(inv.chat_id, "chan_9");
        assert_eq!(inv.sender_id, "user_7");
        assert_eq!(inv.arg("items"), Some("milk eggs"));
        assert_eq!(inv.arg("list"), Some("groceries"));
        assert_eq!(inv.metadata.get("interaction_id").unwrap(), "int_1");
        assert_eq!(inv.metadata.get("interaction_token").unwrap(), "tok_abc");
    }

    #[test]
    fn test_parse_interaction_dm_user_field() {
        let data = json!({
            "id": "int_2",
            "token": "tok",
            "type": 2,
            "channel_id": "dm_1",
            "user": { "id": "user_3" },
            "data": { "name": "lists" }
        });

        let inv = parse_interaction(&data).unwrap();
        assert_eq!(inv.sender_id, "user_3");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn test_parse_interaction_rejects_non_commands() {
        // Type 3 is a message component, not a command.
        let data = json!({
            "type": 3,
            "channel_id": "c",
            "user": { "id": "u" },
            "data": { "name": "create" }
        });
        assert!(parse_interaction(&data).is_none());
    }

    #[tokio::test]
    async fn test_handle_message_create_publishes_text() {
        let bus = Arc::new(MessageBus::new(32));
        let ch = DiscordChannel::new("t".into(), "app".into(), bus.clone(), vec![]);

        let data = json!({
            "author": { "id": "user_1", "username": "tester" },
            "channel_id": "chan_1",
            "content": "confirm"
        });
        ch.handle_message_create(&data).await;

        match bus.consume_inbound().await.unwrap() {
            InboundEvent::Text(t) => {
                assert_eq!(t.sender_id, "user_1");
                assert_eq!(t.chat_id, "chan_1");
                assert_eq!(t.content, "confirm");
            }
            _ => panic!("expected a text event"),
        }
    }

    #[tokio::test]
    async fn test_handle_message_create_ignores_bots() {
        let bus = Arc::new(MessageBus::new(32));
        let ch = DiscordChannel::new("t".into(), "app".into(), bus.clone(), vec![]);

        let data = json!({
            "author": { "id": "bot_1", "bot": true },
            "channel_id": "chan_1",
            "content": "confirm"
        });
        ch.handle_message_create(&data).await;
        // Nothing published; a follow-up message proves the queue is empty.
        let probe = TextMessage::new("discord", "probe", "c", "x");
        bus.publish_inbound(InboundEvent::Text(probe)).await.unwrap();
        match bus.consume_inbound().await.unwrap() {
            InboundEvent::Text(t) => assert_eq!(t.sender_id, "probe"),
            _ => panic!("expected the probe event"),
        }
    }

    #[tokio::test]
    async fn test_handle_message_create_skips_empty() {
        let bus = Arc::new(MessageBus::new(32));
        let ch = DiscordChannel::new("t".into(), "app".into(), bus.clone(), vec![]);

        let data = json!({
            "author": { "id": "user_1" },
            "channel_id": "chan_1",
            "content": ""
        });
        ch.handle_message_create(&data).await;

        let probe = TextMessage::new("discord", "probe", "c", "x");
        bus.publish_inbound(InboundEvent::Text(probe)).await.unwrap();
        match bus.consume_inbound().await.unwrap() {
            InboundEvent::Text(t) => assert_eq!(t.sender_id, "probe"),
            _ => panic!("expected the probe event"),
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(DISCORD_MAX_LEN, 2000);
        assert_eq!(DEFAULT_INTENTS, 37377);
    }

    #[test]
    fn test_rand_jitter_range() {
        let j = rand_jitter();
        assert!((0.0..1.0).contains(&j));
    }
}
