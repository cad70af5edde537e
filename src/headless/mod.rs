//! JSON event output (`--json`)
//!
//! Events are written as NDJSON (newline-delimited JSON), one per line. Each
//! carries an "event" field naming its type plus a millisecond timestamp.
//!
//! # Example Output
//!
//! ```json
//! {"event":"devices","devices":[{"id":"ABC","transport":"usb","status":"device"}],"skipped_lines":0,"timestamp":1704700001000}
//! {"event":"selected","device_id":"ABC","timestamp":1704700001001}
//! {"event":"console","level":"info","time":"14:05:07","message":"Selected: ABC","timestamp":1704700001001}
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use deck_app::EngineEvent;
use deck_bridge::ToolAvailability;
use deck_core::{CaptureKind, ConsoleLevel, Device};
use serde::Serialize;
use tracing::error;

/// Events emitted with `--json`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Device list after a refresh
    Devices {
        devices: Vec<Device>,
        skipped_lines: usize,
        timestamp: i64,
    },

    /// Selection changed
    Selected {
        device_id: Option<String>,
        timestamp: i64,
    },

    /// Console line
    Console {
        level: ConsoleLevel,
        time: String,
        message: String,
        timestamp: i64,
    },

    /// Capture written to disk
    CaptureSaved {
        device_id: String,
        kind: CaptureKind,
        path: PathBuf,
        success: bool,
        timestamp: i64,
    },

    /// Mirroring tool spawned
    MirrorStarted {
        device_id: String,
        pid: u32,
        timestamp: i64,
    },

    /// Tool resolution report (`doctor`)
    Tools {
        tools: ToolAvailability,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn tools(tools: ToolAvailability) -> Self {
        Self::Tools {
            tools,
            timestamp: Self::now(),
        }
    }
}

impl From<EngineEvent> for HeadlessEvent {
    fn from(event: EngineEvent) -> Self {
        let timestamp = Self::now();
        match event {
            EngineEvent::DevicesRefreshed {
                devices,
                skipped_lines,
            } => Self::Devices {
                devices,
                skipped_lines,
                timestamp,
            },
            EngineEvent::SelectionChanged { device_id } => Self::Selected {
                device_id,
                timestamp,
            },
            EngineEvent::Console(entry) => Self::Console {
                level: entry.level,
                time: entry.formatted_time(),
                message: entry.message,
                timestamp,
            },
            EngineEvent::CaptureFinished {
                device_id,
                kind,
                path,
                success,
            } => Self::CaptureSaved {
                device_id,
                kind,
                path,
                success,
                timestamp,
            },
            EngineEvent::MirrorStarted { device_id, pid } => Self::MirrorStarted {
                device_id,
                pid,
                timestamp,
            },
        }
    }
}
