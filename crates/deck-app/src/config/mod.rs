//! Configuration file parsing for adb-deck
//!
//! Supports:
//! - `.adeck/config.toml` - Tool names, ports, capture destination
//! - `.adeck/settings.local.toml` - Per-user preferences (last device)

pub mod settings;
pub mod types;

pub use settings::{
    init_config_dir, load_last_selection, load_settings, load_user_preferences,
    save_last_selection, save_user_preferences,
};
pub use types::*;
