//! One-shot command execution for `adeck`
//!
//! Every invocation restores the last selected device, refreshes the device
//! list, runs the requested command, saves the selection, then renders what
//! happened as console lines or NDJSON events.

use std::path::Path;

use clap::Subcommand;
use deck_app::{Engine, EngineEvent};
use deck_bridge::{find_device, DeviceAction, ToolAvailability};
use deck_core::prelude::*;
use deck_core::{CaptureKind, ConsoleEntry, Device};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::headless::HeadlessEvent;

/// `adeck` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List attached devices (the selected one is marked with `*`)
    Devices,

    /// Select a device by identifier
    Select {
        #[arg(value_name = "ID")]
        device_id: String,
    },

    /// Connect to a device over TCP/IP
    Connect {
        host: String,
        /// Defaults to the configured port (5555)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Disconnect a TCP/IP device
    Disconnect {
        host: String,
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run a quick action on the selected device
    /// (root, remount, settings, reboot, enable-launcher, disable-launcher)
    Action { action: DeviceAction },

    /// Start screen mirroring for the selected device
    Mirror,

    /// Capture logs from the selected device (logcat, dmesg, tombstones, anr)
    Capture { kind: CaptureKind },

    /// Show where adb and scrcpy resolve to
    Doctor,
}

/// Run one command against a fresh engine rooted at `base_dir`
///
/// Command failures are reported on the console, not returned.
pub async fn run(base_dir: &Path, json: bool, command: Command) -> Result<()> {
    info!("Base directory: {}", base_dir.display());

    let mut engine = Engine::new(base_dir.to_path_buf());
    let mut events = engine.subscribe();

    engine.restore_selection();
    if let Err(e) = engine.refresh().await {
        warn!("Initial refresh failed: {}", e);
    }

    if let Err(e) = execute(&mut engine, &command).await {
        debug!("{:?} finished with error: {}", command, e);
    }

    if let Err(e) = engine.persist_selection() {
        warn!("Failed to save selection: {}", e);
    }

    let events = drain_events(&mut events);
    if json {
        render_json(&engine, &command, events);
    } else {
        render_text(&engine, &command, events);
    }

    Ok(())
}

async fn execute(engine: &mut Engine, command: &Command) -> Result<()> {
    match command {
        Command::Devices | Command::Doctor => {}
        Command::Select { device_id } => engine.select(device_id),
        Command::Connect { host, port } => {
            engine.connect(host, *port).await?;
        }
        Command::Disconnect { host, port } => {
            engine.disconnect(host, *port).await?;
        }
        Command::Action { action } => {
            engine.run_action(*action).await?;
        }
        Command::Mirror => {
            engine.launch_mirror()?;
        }
        Command::Capture { kind } => {
            engine.capture(*kind).await?;
        }
    }
    Ok(())
}

fn drain_events(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("Dropped {} engine events", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    events
}

// ─────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────

fn render_json(engine: &Engine, command: &Command, events: Vec<EngineEvent>) {
    for event in events {
        HeadlessEvent::from(event).emit();
    }

    if *command == Command::Doctor {
        HeadlessEvent::tools(engine.tool_availability()).emit();
    }
}

fn render_text(engine: &Engine, command: &Command, events: Vec<EngineEvent>) {
    for event in events {
        if let EngineEvent::Console(entry) = event {
            print_console_line(&entry);
        }
    }

    match command {
        Command::Devices => {
            print!("{}", format_device_table(engine.devices(), engine.selected()));
        }
        Command::Doctor => {
            print!("{}", format_tool_report(&engine.tool_availability()));
        }
        _ => {}
    }
}

fn print_console_line(entry: &ConsoleEntry) {
    if entry.is_error() {
        eprintln!("{}", entry.display_line());
    } else {
        println!("{}", entry.display_line());
    }
}

/// Device table with the selected row marked
pub fn format_device_table(devices: &[Device], selected: Option<&str>) -> String {
    if devices.is_empty() {
        return match selected {
            Some(id) => format!("No devices attached (selected: {}, not listed)\n", id),
            None => "No devices attached\n".to_string(),
        };
    }

    let id_width = devices
        .iter()
        .map(|d| d.id.len())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    let mut out = format!("  {:<id_width$}  {:<9}  STATUS\n", "ID", "TRANSPORT");
    for device in devices {
        let marker = if selected == Some(device.id.as_str()) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {:<id_width$}  {:<9}  {}\n",
            marker,
            device.id,
            device.transport.label(),
            device.status
        ));
    }

    if let Some(id) = selected {
        match find_device(devices, id) {
            None => out.push_str(&format!("Selected device {} is not listed\n", id)),
            Some(device) if !device.status.is_ready() => out.push_str(&format!(
                "Selected device {} is {}; commands will likely fail\n",
                id, device.status
            )),
            Some(_) => {}
        }
    }

    out
}

/// One line per tool plus install hints for missing ones
pub fn format_tool_report(tools: &ToolAvailability) -> String {
    let mut out = String::new();
    for status in [&tools.bridge, &tools.mirror] {
        let location = status
            .resolved
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| format!("not found ({})", status.path.display()));
        out.push_str(&format!("{:<7} {}\n", status.name, location));
    }

    for hint in [
        tools.bridge_unavailable_message(),
        tools.mirror_unavailable_message(),
    ]
    .into_iter()
    .flatten()
    {
        out.push_str(hint);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::DeviceStatus;

    #[test]
    fn test_device_table_marks_selection() {
        let devices = vec![
            Device::new("192.168.1.5:5555", DeviceStatus::Device),
            Device::new("ABCDEF123", DeviceStatus::Unauthorized),
        ];

        let table = format_device_table(&devices, Some("192.168.1.5:5555"));
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("TRANSPORT"));
        assert!(lines[1].starts_with("* 192.168.1.5:5555"));
        assert!(lines[1].contains("TCP/IP"));
        assert!(lines[2].starts_with("  ABCDEF123"));
        assert!(lines[2].ends_with("unauthorized"));
    }

    #[test]
    fn test_device_table_warns_when_selection_not_ready() {
        let devices = vec![
            Device::new("192.168.1.5:5555", DeviceStatus::Device),
            Device::new("ABCDEF123", DeviceStatus::Unauthorized),
        ];

        let table = format_device_table(&devices, Some("ABCDEF123"));

        assert!(table.lines().nth(2).unwrap().starts_with("* ABCDEF123"));
        assert!(table.ends_with(
            "Selected device ABCDEF123 is unauthorized; commands will likely fail\n"
        ));
    }

    #[test]
    fn test_device_table_reports_unlisted_selection() {
        let devices = vec![Device::new("A", DeviceStatus::Device)];
        let table = format_device_table(&devices, Some("gone:5555"));
        assert!(table.ends_with("Selected device gone:5555 is not listed\n"));

        assert_eq!(format_device_table(&[], None), "No devices attached\n");
    }
}
