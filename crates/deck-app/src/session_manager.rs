//! Owns the device selection and the most recent device list

use std::sync::Arc;

use deck_bridge::{
    find_device, parse_device_list, BridgeCommand, CommandOutput, CommandRunner, DeviceAction,
    NetworkAddress, DEFAULT_ADB_PORT,
};
use deck_core::prelude::*;
use deck_core::Device;

/// Selection state plus the last enumeration result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Selected identifier; kept even when it drops out of `devices`
    selected: Option<String>,

    /// Devices in bridge order
    devices: Vec<Device>,

    /// Lines the last parse could not use
    skipped_lines: usize,
}

impl Session {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// The selected device's record from the last listing
    pub fn selected_device(&self) -> Option<&Device> {
        find_device(&self.devices, self.selected.as_deref()?)
    }

    /// Whether the selected identifier appeared in the last listing
    pub fn selected_is_listed(&self) -> bool {
        self.selected_device().is_some()
    }
}

/// A bridge command bound to the device it is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub command: BridgeCommand,
    /// `None` for commands addressed to the bridge server itself
    pub target: Option<String>,
}

impl PreparedCommand {
    pub fn args(&self) -> Vec<String> {
        self.command.args()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// What a refresh did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Bridge exit status of `devices -l`
    pub success: bool,
    pub output: String,
    pub device_count: usize,
    pub skipped_lines: usize,
    /// Set when the refresh moved the session out of NoSelection
    pub auto_selected: Option<String>,
}

/// Result of a connect/disconnect: the bridge reply and the refresh after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOutcome {
    pub address: NetworkAddress,
    pub command: CommandOutput,
    pub refresh: RefreshOutcome,
}

/// Manages device selection on top of a [`CommandRunner`]
///
/// Each operation comes in two halves: a `*_command` method that validates
/// against the session and builds a [`PreparedCommand`], and the part that
/// applies the bridge output. The synchronous methods run both halves on the
/// owned runner; the engine runs the first half, dispatches, then applies.
pub struct SessionManager {
    runner: Arc<dyn CommandRunner>,
    session: Session,
    /// Port used when connect/disconnect is given none
    default_port: u16,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.session)
            .field("default_port", &self.default_port)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            session: Session::default(),
            default_port: DEFAULT_ADB_PORT,
        }
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    /// Shared handle to the runner, for off-thread dispatch
    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn devices(&self) -> &[Device] {
        self.session.devices()
    }

    pub fn selected(&self) -> Option<&str> {
        self.session.selected()
    }

    /// Bind `command` to the selection if it is device scoped
    ///
    /// Fails with [`Error::NoDeviceSelected`] before anything is spawned.
    pub fn prepare(&self, command: BridgeCommand) -> Result<PreparedCommand> {
        let target = if command.is_device_scoped() {
            Some(self.current_target()?.to_string())
        } else {
            None
        };
        Ok(PreparedCommand { command, target })
    }

    /// Run a prepared command on the owned runner
    pub fn execute(&self, prepared: &PreparedCommand) -> CommandOutput {
        self.runner.run(&prepared.args(), prepared.target())
    }

    pub fn refresh_command() -> PreparedCommand {
        PreparedCommand {
            command: BridgeCommand::ListDevices,
            target: None,
        }
    }

    /// Enumerate devices and update the selection
    pub fn refresh(&mut self) -> RefreshOutcome {
        let output = self.execute(&Self::refresh_command());
        self.apply_refresh(output)
    }

    /// Apply a `devices -l` result obtained elsewhere
    ///
    /// Auto-selects the first device only when nothing is selected yet; an
    /// existing selection is never replaced or cleared here.
    pub fn apply_refresh(&mut self, output: CommandOutput) -> RefreshOutcome {
        if !output.success {
            warn!("Device enumeration failed: {}", output.output.trim());
        }

        let list = parse_device_list(&output.output);
        self.session.devices = list.devices;
        self.session.skipped_lines = list.skipped_lines;

        let mut auto_selected = None;
        if self.current_target().is_err() {
            if let Some(first) = self.session.devices.first() {
                debug!("Auto-selecting first device {}", first.id);
                self.session.selected = Some(first.id.clone());
                auto_selected = Some(first.id.clone());
            }
        } else if !self.session.selected_is_listed() {
            debug!(
                "Selected device {:?} not in current listing, keeping it",
                self.session.selected
            );
        }

        RefreshOutcome {
            success: output.success,
            output: output.output,
            device_count: self.session.devices.len(),
            skipped_lines: self.session.skipped_lines,
            auto_selected,
        }
    }

    /// Select a device by identifier, without checking it exists
    pub fn select(&mut self, device_id: impl Into<String>) {
        let device_id = device_id.into();
        info!("Selected device {}", device_id);
        self.session.selected = Some(device_id);
    }

    /// The selected identifier, or [`Error::NoDeviceSelected`]
    pub fn current_target(&self) -> Result<&str> {
        self.session
            .selected
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::NoDeviceSelected)
    }

    /// `host:port`, falling back to the configured default port
    pub fn network_address(&self, host: &str, port: Option<u16>) -> Result<NetworkAddress> {
        NetworkAddress::new(host, Some(port.unwrap_or(self.default_port)))
    }

    pub fn connect_command(&self, host: &str, port: Option<u16>) -> Result<PreparedCommand> {
        self.prepare(BridgeCommand::Connect(self.network_address(host, port)?))
    }

    pub fn disconnect_command(&self, host: &str, port: Option<u16>) -> Result<PreparedCommand> {
        self.prepare(BridgeCommand::Disconnect(self.network_address(host, port)?))
    }

    /// `adb connect host:port`, then refresh whatever the connect returned
    pub fn connect_network(&mut self, host: &str, port: Option<u16>) -> Result<NetworkOutcome> {
        let address = self.network_address(host, port)?;
        self.network_command(BridgeCommand::Connect(address.clone()), address)
    }

    /// `adb disconnect host:port`, then refresh
    pub fn disconnect_network(&mut self, host: &str, port: Option<u16>) -> Result<NetworkOutcome> {
        let address = self.network_address(host, port)?;
        self.network_command(BridgeCommand::Disconnect(address.clone()), address)
    }

    fn network_command(
        &mut self,
        command: BridgeCommand,
        address: NetworkAddress,
    ) -> Result<NetworkOutcome> {
        let output = self.execute(&self.prepare(command)?);
        let refresh = self.refresh();
        Ok(NetworkOutcome {
            address,
            command: output,
            refresh,
        })
    }

    /// Run a device-scoped command against the selection
    ///
    /// Refuses before spawning anything when no device is selected.
    pub fn run_scoped(&self, args: &[String]) -> Result<CommandOutput> {
        let target = self.current_target()?;
        Ok(self.runner.run(args, Some(target)))
    }

    pub fn action_command(&self, action: DeviceAction) -> Result<PreparedCommand> {
        self.prepare(BridgeCommand::Action(action))
    }

    pub fn run_action(&self, action: DeviceAction) -> Result<CommandOutput> {
        Ok(self.execute(&self.action_command(action)?))
    }
}
