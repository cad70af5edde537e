//! Engine: owns the session and routes every operation through the
//! per-device command lanes
//!
//! The Engine is the single owner of the [`SessionManager`]. Bridge calls are
//! awaited on the dispatcher and their results applied here, so session state
//! is only ever mutated from one place. User-visible results are appended to
//! the [`Console`] and broadcast as [`EngineEvent`]s.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use deck_bridge::{
    BridgeRunner, CommandOutput, CommandRunner, DeviceAction, ExecutableLocator, MirrorLauncher,
    ToolAvailability,
};
use deck_core::prelude::*;
use deck_core::{CaptureKind, ConsoleEntry, Device};
use tokio::sync::broadcast;

use crate::capture::{CaptureOrchestrator, CaptureOutcome};
use crate::config::{
    init_config_dir, load_last_selection, load_settings, save_last_selection, Settings,
};
use crate::console::Console;
use crate::dispatch::CommandDispatcher;
use crate::engine_event::EngineEvent;
use crate::session_manager::{PreparedCommand, RefreshOutcome, Session, SessionManager};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fallback text shown when a command succeeds silently
const SILENT_SUCCESS: &str = "Success";

/// Device session engine shared by all front ends
pub struct Engine {
    base_dir: PathBuf,
    settings: Settings,
    locator: ExecutableLocator,
    session_manager: SessionManager,
    capture: CaptureOrchestrator,
    dispatcher: CommandDispatcher,
    mirror: MirrorLauncher,
    console: Console,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("base_dir", &self.base_dir)
            .field("session", self.session_manager.session())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine for `base_dir`, loading `.adeck/config.toml` and locating `adb`
    ///
    /// Writes a default config file on first use.
    pub fn new(base_dir: PathBuf) -> Self {
        if let Err(e) = init_config_dir(&base_dir) {
            warn!("Could not write default config: {}", e);
        }

        let settings = load_settings(&base_dir);
        let locator = locator_for(&base_dir, &settings);
        let bridge_path = locator.locate(&settings.bridge.binary);
        info!("Using bridge at {}", bridge_path.display());

        let runner: Arc<dyn CommandRunner> = Arc::new(BridgeRunner::new(bridge_path));
        Self::with_runner(base_dir, settings, runner)
    }

    /// Engine driven by the given runner
    pub fn with_runner(
        base_dir: PathBuf,
        settings: Settings,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let locator = locator_for(&base_dir, &settings);
        let mirror = MirrorLauncher::new(locator.locate(&settings.mirror.binary));
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            console: Console::new(settings.console.max_entries),
            session_manager: SessionManager::new(Arc::clone(&runner))
                .with_default_port(settings.bridge.default_port),
            capture: CaptureOrchestrator::new(Arc::clone(&runner)),
            dispatcher: CommandDispatcher::new(runner),
            base_dir,
            settings,
            locator,
            mirror,
            event_tx,
        }
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        self.session_manager.session()
    }

    pub fn devices(&self) -> &[Device] {
        self.session_manager.devices()
    }

    pub fn selected(&self) -> Option<&str> {
        self.session_manager.selected()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Root directory captures are written under
    pub fn capture_root(&self) -> PathBuf {
        self.settings.capture.resolve_root(&self.base_dir)
    }

    pub fn tool_availability(&self) -> ToolAvailability {
        ToolAvailability::check_names(
            &self.locator,
            &self.settings.bridge.binary,
            &self.settings.mirror.binary,
        )
    }

    // ─────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────

    /// Re-select the device saved by a previous run, if any
    pub fn restore_selection(&mut self) -> Option<String> {
        let device_id = load_last_selection(&self.base_dir)?;
        debug!("Restoring last selected device {}", device_id);
        self.session_manager.select(device_id.clone());
        self.emit(EngineEvent::SelectionChanged {
            device_id: Some(device_id.clone()),
        });
        Some(device_id)
    }

    /// Save the current selection for the next run
    pub fn persist_selection(&self) -> Result<()> {
        save_last_selection(&self.base_dir, self.selected())
    }

    pub fn select(&mut self, device_id: &str) {
        self.session_manager.select(device_id);
        self.log_info(format!("Selected: {}", device_id));
        self.emit(EngineEvent::SelectionChanged {
            device_id: Some(device_id.to_string()),
        });
    }

    // ─────────────────────────────────────────────────────────
    // Bridge Operations
    // ─────────────────────────────────────────────────────────

    /// Enumerate devices and apply the result to the session
    pub async fn refresh(&mut self) -> Result<RefreshOutcome> {
        let output = self.dispatch(SessionManager::refresh_command()).await?;
        let outcome = self.session_manager.apply_refresh(output);

        if !outcome.success {
            self.log_error(format!(
                "Device refresh failed: {}",
                outcome.output.trim()
            ));
        }

        self.emit(EngineEvent::DevicesRefreshed {
            devices: self.devices().to_vec(),
            skipped_lines: outcome.skipped_lines,
        });

        if let Some(device_id) = &outcome.auto_selected {
            self.log_info(format!("Selected: {}", device_id));
            self.emit(EngineEvent::SelectionChanged {
                device_id: Some(device_id.clone()),
            });
        }

        Ok(outcome)
    }

    /// `adb connect`, then refresh regardless of the outcome
    pub async fn connect(&mut self, host: &str, port: Option<u16>) -> Result<CommandOutput> {
        let prepared = self
            .session_manager
            .connect_command(host, port)
            .map_err(|e| self.report(e))?;
        self.network_command(prepared).await
    }

    /// `adb disconnect`, then refresh regardless of the outcome
    pub async fn disconnect(&mut self, host: &str, port: Option<u16>) -> Result<CommandOutput> {
        let prepared = self
            .session_manager
            .disconnect_command(host, port)
            .map_err(|e| self.report(e))?;
        self.network_command(prepared).await
    }

    /// Run a quick action against the selected device
    pub async fn run_action(&mut self, action: DeviceAction) -> Result<CommandOutput> {
        let prepared = self
            .session_manager
            .action_command(action)
            .map_err(|e| self.report(e))?;
        debug!("Running action {} on {:?}", action, prepared.target());

        let output = self.dispatch(prepared).await?;
        self.log_output(&output);
        Ok(output)
    }

    /// Capture `kind` from the selected device into the capture root
    pub async fn capture(&mut self, kind: CaptureKind) -> Result<CaptureOutcome> {
        let target = self.current_target()?;
        let root = self.capture_root();
        let orchestrator = self.capture.clone();
        let lane = target.clone();

        let result = self
            .dispatcher
            .submit(Some(&lane), move || orchestrator.capture(kind, &target, &root))
            .await
            .and_then(|result| result);

        match result {
            Ok(outcome) => {
                self.push_console(outcome.console_entry());
                self.emit(EngineEvent::CaptureFinished {
                    device_id: outcome.device_id.clone(),
                    kind: outcome.kind,
                    path: outcome.path.clone(),
                    success: outcome.success,
                });
                Ok(outcome)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Start the mirroring tool for the selected device
    ///
    /// Only the spawn is reported; the mirror's own lifetime is not tracked.
    pub fn launch_mirror(&mut self) -> Result<u32> {
        let target = self.current_target()?;

        match self.mirror.launch(&target) {
            Ok(pid) => {
                self.log_info(format!("Mirror started for {}", target));
                self.emit(EngineEvent::MirrorStarted {
                    device_id: target,
                    pid,
                });
                Ok(pid)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────

    fn current_target(&mut self) -> Result<String> {
        match self.session_manager.current_target() {
            Ok(target) => Ok(target.to_string()),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Run a prepared command on its lane
    async fn dispatch(&mut self, prepared: PreparedCommand) -> Result<CommandOutput> {
        self.dispatcher
            .run(prepared.args(), prepared.target())
            .await
            .map_err(|e| self.report(e))
    }

    async fn network_command(&mut self, prepared: PreparedCommand) -> Result<CommandOutput> {
        let output = self.dispatch(prepared).await?;
        self.log_output(&output);
        self.refresh().await?;
        Ok(output)
    }

    /// Surface an error on the console and hand it back
    fn report(&mut self, err: Error) -> Error {
        if err.is_recoverable() {
            debug!("Reported to console: {}", err);
        } else {
            error!("{}", err);
        }
        self.log_error(err.to_string());
        err
    }

    fn log_output(&mut self, output: &CommandOutput) {
        let text = output.summary_or(SILENT_SUCCESS).to_string();
        if output.success {
            self.log_info(text);
        } else {
            self.log_error(text);
        }
    }

    fn log_info(&mut self, message: impl Into<String>) {
        let entry = self.console.info(message);
        self.emit(EngineEvent::Console(entry));
    }

    fn log_error(&mut self, message: impl Into<String>) {
        let entry = self.console.error(message);
        self.emit(EngineEvent::Console(entry));
    }

    fn push_console(&mut self, entry: ConsoleEntry) {
        let entry = self.console.push(entry);
        self.emit(EngineEvent::Console(entry));
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

fn locator_for(base_dir: &Path, settings: &Settings) -> ExecutableLocator {
    ExecutableLocator::with_bundle_dir(base_dir, settings.bridge.bundle_dir.clone())
}
