//! `listkeeper status` — show configuration and storage status.
//!
//! - Shows config path and whether it exists
//! - Shows Discord credential status and allow-list size
//! - Shows where records live and how many channels hold lists

use anyhow::Result;
use colored::Colorize;

use listkeeper_core::config::load_config;
use listkeeper_core::store::ListStore;
use listkeeper_core::utils::get_data_path;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let data_dir = get_data_path();
    let config_path = data_dir.join("config.json");

    println!();
    println!("{}", "📋 Listkeeper Status".cyan().bold());
    println!();

    // Config
    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Discord
    let discord_status = if config.discord.is_configured() {
        format!("{} (token + application id set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "Discord:".bold(), discord_status);

    if config.discord.allowed_users.is_empty() {
        println!(
            "  {:<18} {}",
            "Allow-list:".bold(),
            "everyone".dimmed()
        );
    } else {
        println!(
            "  {:<18} {} user(s)",
            "Allow-list:".bold(),
            config.discord.allowed_users.len()
        );
    }

    // Storage
    let records_dir = crate::helpers::expand_tilde(&config.storage.data_dir).join("records");
    let records_exist = records_dir.exists();
    println!(
        "  {:<18} {} {}",
        "Records:".bold(),
        records_dir.display(),
        if records_exist {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    if records_exist {
        let store = ListStore::new(Some(records_dir))?;
        println!(
            "  {:<18} {} channel(s) with lists",
            "Scopes:".bold(),
            store.scope_count()
        );
    }

    // Deletion
    println!(
        "  {:<18} {}",
        "Confirm window:".bold(),
        format!("{}s", config.deletion.confirm_timeout_secs).dimmed()
    );

    println!();

    Ok(())
}
