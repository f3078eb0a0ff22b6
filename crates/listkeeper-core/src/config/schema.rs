//! Configuration schema.
//!
//! Hierarchy: `Config` → `DiscordConfig`, `StorageConfig`, `DeletionConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

/// Root configuration — loaded from `~/.listkeeper/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub discord: DiscordConfig,
    pub storage: StorageConfig,
    pub deletion: DeletionConfig,
}

/// Discord channel config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal.
    #[serde(default)]
    pub token: String,
    /// Application id, needed to register slash commands.
    #[serde(default)]
    pub application_id: String,
    /// Allow-list of Discord user IDs. Empty = allow everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl DiscordConfig {
    /// Whether this channel has enough config to start.
    ///
    /// Both the token and the application id are needed: the latter is
    /// required for slash-command registration and followup webhooks.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.application_id.is_empty()
    }
}

/// Where records live on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Data directory; records go under `<dataDir>/records/`.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.listkeeper".to_string(),
        }
    }
}

/// Delete-confirmation behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeletionConfig {
    /// How long a `/delete` waits for "confirm" before cancelling.
    pub confirm_timeout_secs: u64,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            confirm_timeout_secs: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.discord.token.is_empty());
        assert!(!config.discord.is_configured());
        assert_eq!(config.storage.data_dir, "~/.listkeeper");
        assert_eq!(config.deletion.confirm_timeout_secs, 20);
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "discord": {
                "token": "bot-token-123",
                "applicationId": "9876",
                "allowedUsers": ["u1", "u2"]
            },
            "deletion": {
                "confirmTimeoutSecs": 5
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.discord.token, "bot-token-123");
        assert_eq!(config.discord.application_id, "9876");
        assert!(config.discord.is_configured());
        assert_eq!(config.discord.allowed_users, vec!["u1", "u2"]);
        assert_eq!(config.deletion.confirm_timeout_secs, 5);
        // Defaults preserved for missing fields
        assert_eq!(config.storage.data_dir, "~/.listkeeper");
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["discord"].get("applicationId").is_some());
        assert!(json["deletion"].get("confirmTimeoutSecs").is_some());
        assert!(json["discord"].get("application_id").is_none());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.deletion.confirm_timeout_secs, 20);
        assert!(config.discord.allowed_users.is_empty());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let mut config = Config::default();
        config.discord.token = "tok".into();
        let json_str = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json_str).unwrap();
        assert_eq!(deserialized.discord.token, "tok");
        assert_eq!(deserialized.storage.data_dir, config.storage.data_dir);
    }
}
