//! `listkeeper onboard` — initialize configuration and data directory.
//!
//! - Creates `~/.listkeeper/config.json` with defaults
//! - Creates the records directory where per-channel lists live

use anyhow::Result;
use colored::Colorize;

use listkeeper_core::config::{load_config, save_config};
use listkeeper_core::utils::{get_data_path, get_records_path};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "📋 Listkeeper — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    let config_path = data_dir.join("config.json");

    // 1. Create config if it doesn't exist
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let config = load_config(None); // defaults
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    // 2. Ensure the records directory
    let records_dir = get_records_path();
    std::fs::create_dir_all(&records_dir)?;
    println!("  {} records dir at {}", "✓".green(), records_dir.display());

    println!();
    println!(
        "{}",
        "  Setup complete! Add your Discord token + application id to".green()
    );
    println!(
        "{}",
        format!("  {} and run `listkeeper gateway`.", config_path.display()).green()
    );
    println!();

    Ok(())
}
