//! Gateway command — orchestrates channels, the command engine, and routing.
//!
//! Startup sequence:
//! 1. Load config
//! 2. Create message bus + list store
//! 3. Create the command engine
//! 4. Create channel manager, register configured channels
//! 5. Run: `tokio::select!` of engine + channel manager
//! 6. Handle Ctrl+C for graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use listkeeper_channels::ChannelManager;
use listkeeper_core::bus::MessageBus;
use listkeeper_core::config::load_config;
use listkeeper_core::engine::Engine;
use listkeeper_core::store::ListStore;

use crate::helpers;

/// Run the gateway — starts the command engine + channel manager.
pub async fn run() -> Result<()> {
    helpers::print_banner();
    println!("  Mode: Gateway");
    println!();

    // 1. Load config
    let config = load_config(None);

    // 2. Bus + store (shared between engine and channels)
    let bus = Arc::new(MessageBus::new(100));
    let records_dir = helpers::expand_tilde(&config.storage.data_dir).join("records");
    let store = Arc::new(
        ListStore::new(Some(records_dir.clone()))
            .with_context(|| format!("failed to open records dir: {}", records_dir.display()))?,
    );

    // 3. Command engine
    let engine = Arc::new(Engine::new(
        bus.clone(),
        store.clone(),
        Duration::from_secs(config.deletion.confirm_timeout_secs),
    ));

    // 4. Channel manager + configured channels
    #[allow(unused_mut)]
    let mut channel_manager = ChannelManager::new(bus.clone());

    #[cfg(feature = "discord")]
    {
        let dc = &config.discord;
        if dc.is_configured() {
            use listkeeper_channels::discord::DiscordChannel;
            let discord = DiscordChannel::new(
                dc.token.clone(),
                dc.application_id.clone(),
                bus.clone(),
                dc.allowed_users.clone(),
            );
            channel_manager.register(Arc::new(discord));
            info!("registered discord channel");
        }
    }

    info!(
        records = %records_dir.display(),
        channels = ?channel_manager.channel_names(),
        "gateway starting"
    );

    println!("  Records:   {}", records_dir.display());
    println!("  Channels:  {} registered", channel_manager.len());
    println!(
        "  Confirm:   deletions wait {}s for \"confirm\"",
        config.deletion.confirm_timeout_secs
    );
    println!();

    if channel_manager.is_empty() {
        println!("  ⚠  No channels registered. The engine will run but only");
        println!("     process events from the internal bus.");
        println!("     Set discord.token + discord.applicationId in ~/.listkeeper/config.json");
        println!();
    }

    println!("  Ctrl+C to stop");
    println!();

    // 5. Run engine + channel manager until Ctrl+C
    tokio::select! {
        _ = engine.run() => {
            info!("engine exited");
        }
        result = channel_manager.start_all() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "channel manager error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("  Shutting down...");
            info!("received Ctrl+C, shutting down");
            channel_manager.stop_all().await;
        }
    }

    println!("  Gateway stopped. Goodbye!");
    Ok(())
}
