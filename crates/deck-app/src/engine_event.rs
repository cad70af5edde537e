//! Domain events emitted by the Engine for external consumers
//!
//! Front ends subscribe via `Engine::subscribe()` and render these instead of
//! polling engine state.

use std::path::PathBuf;

use deck_core::{CaptureKind, ConsoleEntry, Device};

/// Domain events emitted by the Engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Devices
    // ─────────────────────────────────────────────────────────
    /// A device enumeration finished
    DevicesRefreshed {
        devices: Vec<Device>,
        skipped_lines: usize,
    },

    /// The selected device changed (explicitly or by auto-select)
    SelectionChanged { device_id: Option<String> },

    // ─────────────────────────────────────────────────────────
    // Console
    // ─────────────────────────────────────────────────────────
    /// A line was appended to the console log
    Console(ConsoleEntry),

    // ─────────────────────────────────────────────────────────
    // Captures and Mirroring
    // ─────────────────────────────────────────────────────────
    CaptureFinished {
        device_id: String,
        kind: CaptureKind,
        path: PathBuf,
        success: bool,
    },

    MirrorStarted { device_id: String, pid: u32 },
}

impl EngineEvent {
    /// Short event name for logging and serialization
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::DevicesRefreshed { .. } => "devices_refreshed",
            EngineEvent::SelectionChanged { .. } => "selection_changed",
            EngineEvent::Console(_) => "console",
            EngineEvent::CaptureFinished { .. } => "capture_finished",
            EngineEvent::MirrorStarted { .. } => "mirror_started",
        }
    }
}
