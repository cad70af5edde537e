//! Settings parser for .adeck/config.toml

use super::types::{Settings, UserPreferences};
use deck_core::prelude::*;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.toml";
const ADECK_DIR: &str = ".adeck";
const LOCAL_SETTINGS_FILENAME: &str = "settings.local.toml";

/// Load settings from .adeck/config.toml
///
/// Missing or unreadable files fall back to defaults.
pub fn load_settings(base_dir: &Path) -> Settings {
    let config_path = base_dir.join(ADECK_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create .adeck/ with a default config.toml if missing
///
/// Idempotent: an existing config file is left untouched.
pub fn init_config_dir(base_dir: &Path) -> Result<()> {
    let adeck_dir = base_dir.join(ADECK_DIR);

    if !adeck_dir.exists() {
        std::fs::create_dir_all(&adeck_dir)
            .map_err(|e| Error::config(format!("Failed to create .adeck dir: {}", e)))?;
        info!("Created .adeck directory");
    }

    let config_path = adeck_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        std::fs::write(&config_path, generate_default_config())
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created default config.toml");
    }

    Ok(())
}

fn generate_default_config() -> String {
    r#"# adb-deck Configuration

[bridge]
binary = "adb"                     # Platform suffix is added automatically
bundle_dir = "scrcpy-win64-v1.25"  # Searched next to and above the executable
default_port = 5555                # Used by `connect` when no port is given

[mirror]
binary = "scrcpy"

[capture]
directory = ""                     # Empty = <base>/logs

[console]
max_entries = 1000
"#
    .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Local Settings (User Preferences)
// ─────────────────────────────────────────────────────────────────────────────

/// Load user preferences from .adeck/settings.local.toml
///
/// Returns None if file doesn't exist (not an error - first run)
pub fn load_user_preferences(base_dir: &Path) -> Option<UserPreferences> {
    let prefs_path = base_dir.join(ADECK_DIR).join(LOCAL_SETTINGS_FILENAME);

    if !prefs_path.exists() {
        debug!("No local settings file at {:?}", prefs_path);
        return None;
    }

    match std::fs::read_to_string(&prefs_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(prefs) => Some(prefs),
            Err(e) => {
                warn!("Failed to parse {:?}: {}", prefs_path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", prefs_path, e);
            None
        }
    }
}

/// Save user preferences to .adeck/settings.local.toml
///
/// Uses atomic write (temp file + rename).
pub fn save_user_preferences(base_dir: &Path, prefs: &UserPreferences) -> Result<()> {
    let adeck_dir = base_dir.join(ADECK_DIR);

    if !adeck_dir.exists() {
        std::fs::create_dir_all(&adeck_dir)
            .map_err(|e| Error::config(format!("Failed to create .adeck dir: {}", e)))?;
    }

    let prefs_path = adeck_dir.join(LOCAL_SETTINGS_FILENAME);
    let temp_path = adeck_dir.join(".settings.local.toml.tmp");

    let header = "# User-specific preferences\n\n";
    let content = toml::to_string_pretty(prefs)
        .map_err(|e| Error::config(format!("Failed to serialize preferences: {}", e)))?;

    std::fs::write(&temp_path, format!("{}{}", header, content))
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &prefs_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    debug!("Saved user preferences to {:?}", prefs_path);
    Ok(())
}

/// Last selected device identifier, if one was saved
pub fn load_last_selection(base_dir: &Path) -> Option<String> {
    load_user_preferences(base_dir)?
        .last_device
        .filter(|id| !id.is_empty())
}

/// Persist the selected device, preserving other preferences
pub fn save_last_selection(base_dir: &Path, device_id: Option<&str>) -> Result<()> {
    let mut prefs = load_user_preferences(base_dir).unwrap_or_default();
    if prefs.last_device.as_deref() == device_id {
        return Ok(());
    }

    prefs.last_device = device_id.map(str::to_string);
    save_user_preferences(base_dir, &prefs)
}
