//! Core domain type definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Devices
// ─────────────────────────────────────────────────────────────────

/// How the bridge reaches a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Locally attached (USB serial)
    Usb,
    /// TCP/IP (`host:port` identifier)
    Network,
}

impl Transport {
    /// Derive the transport from a device identifier
    pub fn from_id(id: &str) -> Self {
        if id.contains(':') {
            Transport::Network
        } else {
            Transport::Usb
        }
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Transport::Usb => "USB",
            Transport::Network => "TCP/IP",
        }
    }
}

/// Connection state token reported by `adb devices`
///
/// Unknown tokens are kept verbatim so newer bridge versions still render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DeviceStatus {
    Device,
    Offline,
    Unauthorized,
    Other(String),
}

impl DeviceStatus {
    pub fn parse(token: &str) -> Self {
        match token {
            "device" => DeviceStatus::Device,
            "offline" => DeviceStatus::Offline,
            "unauthorized" => DeviceStatus::Unauthorized,
            other => DeviceStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Device => "device",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Unauthorized => "unauthorized",
            DeviceStatus::Other(token) => token,
        }
    }

    /// Whether the device accepts commands
    pub fn is_ready(&self) -> bool {
        matches!(self, DeviceStatus::Device)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DeviceStatus {
    fn from(token: String) -> Self {
        DeviceStatus::parse(&token)
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One row of the bridge's device listing
///
/// Rebuilt from scratch on every refresh; only the selected identifier
/// outlives a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// USB serial or `host:port`
    pub id: String,
    pub transport: Transport,
    pub status: DeviceStatus,
}

impl Device {
    pub fn new(id: impl Into<String>, status: DeviceStatus) -> Self {
        let id = id.into();
        Self {
            transport: Transport::from_id(&id),
            id,
            status,
        }
    }

    pub fn is_network(&self) -> bool {
        self.transport == Transport::Network
    }

    /// Directory-safe form of the identifier
    pub fn sanitized_id(&self) -> String {
        sanitize_device_id(&self.id)
    }
}

/// Replace every `:` so the identifier is usable as a path segment
pub fn sanitize_device_id(id: &str) -> String {
    id.replace(':', "_")
}

// ─────────────────────────────────────────────────────────────────
// Capture Kinds
// ─────────────────────────────────────────────────────────────────

/// How a capture kind lands on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStrategy {
    /// Command output written to one `.txt` file
    File,
    /// Remote directory pulled into a local directory
    Directory,
}

/// Diagnostic retrieval operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Logcat,
    Dmesg,
    Tombstones,
    Anr,
}

impl CaptureKind {
    pub const ALL: [CaptureKind; 4] = [
        CaptureKind::Logcat,
        CaptureKind::Dmesg,
        CaptureKind::Tombstones,
        CaptureKind::Anr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureKind::Logcat => "logcat",
            CaptureKind::Dmesg => "dmesg",
            CaptureKind::Tombstones => "tombstones",
            CaptureKind::Anr => "anr",
        }
    }

    pub fn strategy(&self) -> CaptureStrategy {
        match self {
            CaptureKind::Logcat | CaptureKind::Dmesg => CaptureStrategy::File,
            CaptureKind::Tombstones | CaptureKind::Anr => CaptureStrategy::Directory,
        }
    }

    /// Remote directory pulled by the directory strategy
    pub fn remote_dir(&self) -> Option<&'static str> {
        match self {
            CaptureKind::Tombstones => Some("/data/tombstones"),
            CaptureKind::Anr => Some("/data/anr"),
            CaptureKind::Logcat | CaptureKind::Dmesg => None,
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CaptureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::unknown_name("capture kind", s))
    }
}

// ─────────────────────────────────────────────────────────────────
// Console
// ─────────────────────────────────────────────────────────────────

/// Severity flag of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    #[default]
    Info,
    Error,
}

/// A user-visible result line
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleEntry {
    pub timestamp: DateTime<Local>,
    pub level: ConsoleLevel,
    pub message: String,
}

impl ConsoleEntry {
    pub fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.level == ConsoleLevel::Error
    }

    /// Format timestamp for display
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// `[HH:MM:SS] message`
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.formatted_time(), self.message)
    }
}
