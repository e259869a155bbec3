//! Configuration management command
//!
//! Views and edits `.cl/config.toml` of the current workspace.

use crate::util;
use anyhow::{anyhow, Context, Result};
use cl_core::{config, Settings};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let layout = util::find_workspace()?;
    let settings = Settings::load(&layout).context("Failed to load configuration")?;

    println!("{}", "Workspace Configuration".bold());
    println!(
        "{}: {}\n",
        "Location".dimmed(),
        layout.config_file().display().dimmed()
    );

    let mut section = "";
    for &key in Settings::keys() {
        let (head, field) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{}]", head).yellow());
            section = head;
        }
        let value = settings.get(key).unwrap_or_default();
        println!("  {} = {}", field.cyan(), value);
    }

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let layout = util::find_workspace()?;
    let settings = Settings::load(&layout).context("Failed to load configuration")?;

    let value = settings.get(key).ok_or_else(|| {
        anyhow!(
            "Unknown config key: '{}' (valid keys: {})",
            key,
            Settings::keys().join(", ")
        )
    })?;
    println!("{}", value);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let (_lock, mut workspace) = util::lock_and_open()?;

    // 1. Apply to a copy (validated)
    let mut settings = workspace.settings().clone();
    settings.set(key, value)?;

    // 2. Persist
    workspace
        .update_settings(settings)
        .context("Failed to save configuration")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path
pub async fn run_path() -> Result<()> {
    let layout = util::find_workspace()?;
    println!("{}", layout.config_file().display());
    Ok(())
}

/// Print an annotated example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}
