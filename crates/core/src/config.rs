//! Workspace settings stored in `.cl/config.toml`.
//!
//! A missing file means defaults. Every section and field is optional on
//! disk so older config files keep loading as new keys are added.

use crate::store::{atomic_write, read_optional, Layout};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Maximum length of the default shelf name.
const MAX_DEFAULT_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub reconcile: ReconcileSettings,
    pub display: DisplaySettings,
    pub shelf: ShelfSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Stage files as soon as they are assigned to a changelist
    pub auto_stage: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self { auto_stage: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Whether folder nodes start expanded
    pub folders_expanded: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            folders_expanded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfSettings {
    /// Name used when shelving without an explicit name
    pub default_name: String,
}

impl Default for ShelfSettings {
    fn default() -> Self {
        Self {
            default_name: "Shelved changes".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings for a workspace, falling back to defaults if the file is absent.
    pub fn load(layout: &Layout) -> Result<Self> {
        Self::load_from(&layout.config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let Some(content) = read_optional(path)? else {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        };

        let settings: Settings = toml::from_str(&content).map_err(|e| Error::ConfigMalformed {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates and writes settings atomically.
    pub fn save(&self, layout: &Layout) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("failed to serialize settings: {}", e)))?;
        atomic_write(&layout.config_file(), content.as_bytes())?;
        debug!("Saved settings to {}", layout.config_file().display());
        Ok(())
    }

    /// Writes default settings if no config file exists yet.
    pub fn init_if_missing(layout: &Layout) -> Result<()> {
        if layout.config_file().exists() {
            return Ok(());
        }
        Settings::default().save(layout)
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.shelf.default_name.trim();
        if name.is_empty() {
            return Err(Error::InvalidConfig(
                "shelf.default_name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_DEFAULT_NAME_LEN {
            return Err(Error::InvalidConfig(format!(
                "shelf.default_name must be at most {} characters",
                MAX_DEFAULT_NAME_LEN
            )));
        }
        Ok(())
    }

    /// Reads a single value by dotted key (`reconcile.auto_stage`).
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "reconcile.auto_stage" => self.reconcile.auto_stage.to_string(),
            "display.folders_expanded" => self.display.folders_expanded.to_string(),
            "shelf.default_name" => self.shelf.default_name.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets a single value by dotted key. The result is validated.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_bool = |v: &str| -> Result<bool> {
            v.parse::<bool>().map_err(|_| {
                Error::InvalidConfig(format!("{} must be 'true' or 'false', got '{}'", key, v))
            })
        };

        let mut next = self.clone();
        match key {
            "reconcile.auto_stage" => next.reconcile.auto_stage = parse_bool(value)?,
            "display.folders_expanded" => next.display.folders_expanded = parse_bool(value)?,
            "shelf.default_name" => next.shelf.default_name = value.to_string(),
            _ => return Err(Error::InvalidConfig(format!("unknown config key: {}", key))),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Every supported dotted key, in display order.
    pub fn keys() -> &'static [&'static str] {
        &[
            "reconcile.auto_stage",
            "display.folders_expanded",
            "shelf.default_name",
        ]
    }
}

/// Example configuration with comments, for `cl config example`.
pub fn example_config() -> &'static str {
    r#"# Changelist workspace settings (.cl/config.toml)

[reconcile]
# Stage newly detected files when they are assigned to the active changelist
auto_stage = false

[display]
# Start folder nodes expanded in tree output
folders_expanded = true

[shelf]
# Name used by `cl shelve` when --name is not given
default_name = "Shelved changes"
"#
}
