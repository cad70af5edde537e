//! Device discovery using `adb devices -l`

use deck_core::prelude::*;
use deck_core::{Device, DeviceStatus};

/// Arguments of the long-format enumeration command
pub const LIST_DEVICES_ARGS: [&str; 2] = ["devices", "-l"];

/// Parsed device listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    /// Devices in bridge order
    pub devices: Vec<Device>,

    /// Non-blank lines that did not yield a device
    pub skipped_lines: usize,
}

impl DeviceList {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn first(&self) -> Option<&Device> {
        self.devices.first()
    }
}

/// Parse `adb devices -l` output
///
/// Expected shape:
/// ```text
/// List of devices attached
/// 192.168.1.5:5555       device product:sdk model:Pixel_7 transport_id:3
/// ABCDEF123              unauthorized usb:1-1 transport_id:4
/// ```
///
/// `* daemon ...` chatter lines are dropped, then the first line (the header)
/// is always discarded. Blank lines are ignored; lines that carry fewer than
/// two tokens are skipped. Chatter and malformed lines are counted in
/// [`DeviceList::skipped_lines`]. Never fails.
pub fn parse_device_list(output: &str) -> DeviceList {
    let mut list = DeviceList::default();
    let mut chatter_lines = 0;

    // Daemon start-up chatter can precede the header; drop it first so the
    // header is still the line that gets discarded.
    let lines = output.trim().lines().filter(|line| {
        let chatter = line.trim_start().starts_with('*');
        if chatter {
            debug!("Skipping bridge daemon line: {}", line.trim());
            chatter_lines += 1;
        }
        !chatter
    });

    for line in lines.skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(id), Some(status)) => {
                list.devices.push(Device::new(id, DeviceStatus::parse(status)));
            }
            _ => {
                debug!("Skipping malformed device line: {:?}", line);
                list.skipped_lines += 1;
            }
        }
    }
    list.skipped_lines += chatter_lines;

    if list.skipped_lines > 0 {
        warn!(
            "Skipped {} unrecognised line(s) in device listing",
            list.skipped_lines
        );
    }

    list
}

/// Parse `adb devices -l` output into device records
pub fn parse(output: &str) -> Vec<Device> {
    parse_device_list(output).devices
}

/// Find a device by exact identifier
pub fn find_device<'a>(devices: &'a [Device], id: &str) -> Option<&'a Device> {
    devices.iter().find(|d| d.id == id)
}
