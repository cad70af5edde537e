//! Bridge command vocabulary
//!
//! Maps every operation the application performs to the exact `adb`
//! argument vector, and records whether it is device-scoped.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use deck_core::prelude::*;
use deck_core::CaptureKind;

use crate::devices::LIST_DEVICES_ARGS;

/// Port `adb tcpip` devices listen on unless told otherwise
pub const DEFAULT_ADB_PORT: u16 = 5555;

const SETTINGS_ACTIVITY: &str = "com.android.settings/.Settings";
const LAUNCHER_PACKAGE: &str = "com.android.launcher3";

/// `host:port` pair for network connect/disconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddress {
    pub host: String,
    pub port: u16,
}

impl NetworkAddress {
    /// Build an address, defaulting the port to 5555
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Result<Self> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(Error::invalid_address("host is empty"));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(Error::invalid_address(format!(
                "host contains whitespace: {:?}",
                host
            )));
        }

        Ok(Self {
            host,
            port: port.unwrap_or(DEFAULT_ADB_PORT),
        })
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One-shot device-scoped quick actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceAction {
    Root,
    Remount,
    OpenSettings,
    Reboot,
    EnableLauncher,
    DisableLauncher,
}

impl DeviceAction {
    pub const ALL: [DeviceAction; 6] = [
        DeviceAction::Root,
        DeviceAction::Remount,
        DeviceAction::OpenSettings,
        DeviceAction::Reboot,
        DeviceAction::EnableLauncher,
        DeviceAction::DisableLauncher,
    ];

    /// Name accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            DeviceAction::Root => "root",
            DeviceAction::Remount => "remount",
            DeviceAction::OpenSettings => "settings",
            DeviceAction::Reboot => "reboot",
            DeviceAction::EnableLauncher => "enable-launcher",
            DeviceAction::DisableLauncher => "disable-launcher",
        }
    }

    pub fn args(&self) -> Vec<String> {
        let args: &[&str] = match self {
            DeviceAction::Root => &["root"],
            DeviceAction::Remount => &["remount"],
            DeviceAction::OpenSettings => &["shell", "am", "start", "-n", SETTINGS_ACTIVITY],
            DeviceAction::Reboot => &["reboot"],
            DeviceAction::EnableLauncher => &["shell", "pm", "enable", LAUNCHER_PACKAGE],
            DeviceAction::DisableLauncher => &["shell", "pm", "disable", LAUNCHER_PACKAGE],
        };
        to_strings(args)
    }
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceAction::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::unknown_name("action", s))
    }
}

/// Every bridge command the application issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    ListDevices,
    Connect(NetworkAddress),
    Disconnect(NetworkAddress),
    Action(DeviceAction),
    /// Dump the log buffer and exit
    Logcat,
    Dmesg,
    Pull { remote: String, local: String },
}

impl BridgeCommand {
    /// Command whose output a file-strategy capture writes to disk
    pub fn for_text_capture(kind: CaptureKind) -> Option<Self> {
        match kind {
            CaptureKind::Logcat => Some(BridgeCommand::Logcat),
            CaptureKind::Dmesg => Some(BridgeCommand::Dmesg),
            CaptureKind::Tombstones | CaptureKind::Anr => None,
        }
    }

    /// Pull `remote` into the local directory `local`
    pub fn pull(remote: impl Into<String>, local: &Path) -> Self {
        BridgeCommand::Pull {
            remote: remote.into(),
            local: local.to_string_lossy().into_owned(),
        }
    }

    /// Argument vector, excluding the program and device flag
    pub fn args(&self) -> Vec<String> {
        match self {
            BridgeCommand::ListDevices => to_strings(&LIST_DEVICES_ARGS),
            BridgeCommand::Connect(addr) => vec!["connect".to_string(), addr.to_string()],
            BridgeCommand::Disconnect(addr) => vec!["disconnect".to_string(), addr.to_string()],
            BridgeCommand::Action(action) => action.args(),
            BridgeCommand::Logcat => to_strings(&["logcat", "-d"]),
            BridgeCommand::Dmesg => to_strings(&["shell", "dmesg"]),
            BridgeCommand::Pull { remote, local } => {
                vec!["pull".to_string(), remote.clone(), local.clone()]
            }
        }
    }

    /// Whether the command must be sent to the selected device
    ///
    /// Enumeration and network connect/disconnect talk to the bridge server
    /// itself and are never scoped.
    pub fn is_device_scoped(&self) -> bool {
        !matches!(
            self,
            BridgeCommand::ListDevices | BridgeCommand::Connect(_) | BridgeCommand::Disconnect(_)
        )
    }
}

fn to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
