//! Configuration type definitions

use std::path::{Path, PathBuf};

use deck_bridge::{BRIDGE_BINARY, DEFAULT_ADB_PORT, DEFAULT_BUNDLE_DIR, MIRROR_BINARY};
use serde::{Deserialize, Serialize};

/// Application settings (.adeck/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub bridge: BridgeSettings,

    #[serde(default)]
    pub mirror: MirrorSettings,

    #[serde(default)]
    pub capture: CaptureSettings,

    #[serde(default)]
    pub console: ConsoleSettings,
}

/// Bridge tool settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BridgeSettings {
    /// Logical bridge binary name (platform suffix added automatically)
    #[serde(default = "default_bridge_binary")]
    pub binary: String,

    /// Versioned bundle directory searched first
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: String,

    /// Port used by `connect` when none is given
    #[serde(default = "default_port")]
    pub default_port: u16,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            binary: default_bridge_binary(),
            bundle_dir: default_bundle_dir(),
            default_port: default_port(),
        }
    }
}

/// Mirroring tool settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MirrorSettings {
    #[serde(default = "default_mirror_binary")]
    pub binary: String,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            binary: default_mirror_binary(),
        }
    }
}

/// Capture destination settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CaptureSettings {
    /// Destination root; empty means `<base>/logs`
    #[serde(default)]
    pub directory: String,
}

impl CaptureSettings {
    /// Resolve the destination root against the application base directory
    pub fn resolve_root(&self, base_dir: &Path) -> PathBuf {
        let configured = self.directory.trim();
        if configured.is_empty() {
            return base_dir.join(DEFAULT_CAPTURE_DIR);
        }

        let path = PathBuf::from(configured);
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    }
}

/// Console log settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConsoleSettings {
    /// Oldest entries are dropped beyond this count
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

/// Capture root under the base directory
pub const DEFAULT_CAPTURE_DIR: &str = "logs";

fn default_bridge_binary() -> String {
    BRIDGE_BINARY.to_string()
}

fn default_mirror_binary() -> String {
    MIRROR_BINARY.to_string()
}

fn default_bundle_dir() -> String {
    DEFAULT_BUNDLE_DIR.to_string()
}

fn default_port() -> u16 {
    DEFAULT_ADB_PORT
}

fn default_max_entries() -> usize {
    1000
}

/// User-specific preferences (stored in settings.local.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserPreferences {
    /// Last selected device, restored on the next start
    #[serde(default)]
    pub last_device: Option<String>,
}
