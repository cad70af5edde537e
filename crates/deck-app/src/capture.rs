//! Log and crash-artifact capture into per-device folders
//!
//! Layout: `<root>/<sanitized id>/<timestamp>_<kind>.txt` for text dumps
//! (`logcat`, `dmesg`) and `<root>/<sanitized id>/<timestamp>_<kind>/` for
//! pulled directories (`tombstones`, `anr`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use deck_bridge::{BridgeCommand, CommandOutput, CommandRunner};
use deck_core::prelude::*;
use deck_core::{sanitize_device_id, CaptureKind, CaptureStrategy, ConsoleEntry};

/// Timestamp token prefixed to every capture name (sorts chronologically)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One capture, built and executed once
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub kind: CaptureKind,
    pub target: String,
    pub timestamp: DateTime<Local>,
    pub root: PathBuf,
}

impl CaptureRequest {
    /// Request stamped with the current time
    pub fn new(kind: CaptureKind, target: &str, root: impl Into<PathBuf>) -> Result<Self> {
        Self::at(kind, target, root, Local::now())
    }

    pub fn at(
        kind: CaptureKind,
        target: &str,
        root: impl Into<PathBuf>,
        timestamp: DateTime<Local>,
    ) -> Result<Self> {
        if target.is_empty() {
            return Err(Error::NoDeviceSelected);
        }

        Ok(Self {
            kind,
            target: target.to_string(),
            timestamp,
            root: root.into(),
        })
    }

    pub fn timestamp_token(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// `<root>/<sanitized id>`
    pub fn device_dir(&self) -> PathBuf {
        self.root.join(sanitize_device_id(&self.target))
    }

    /// File or directory the capture produces
    pub fn destination(&self) -> PathBuf {
        let stem = format!("{}_{}", self.timestamp_token(), self.kind);
        match self.kind.strategy() {
            CaptureStrategy::File => self.device_dir().join(format!("{}.txt", stem)),
            CaptureStrategy::Directory => self.device_dir().join(stem),
        }
    }

    /// Create the folders, run the bridge, and store the result
    ///
    /// Bridge failures end up in the outcome; only filesystem failures are
    /// returned as errors.
    pub fn execute(&self, runner: &dyn CommandRunner) -> Result<CaptureOutcome> {
        let device_dir = self.device_dir();
        std::fs::create_dir_all(&device_dir)
            .map_err(|e| Error::capture(&device_dir, format!("cannot create directory: {}", e)))?;

        let destination = self.destination();
        let output = match (self.kind.strategy(), self.kind.remote_dir()) {
            (CaptureStrategy::Directory, Some(remote)) => {
                self.pull_directory(runner, remote, &destination)?
            }
            _ => self.dump_to_file(runner, &destination)?,
        };

        if output.success {
            info!("Captured {} from {} to {:?}", self.kind, self.target, destination);
        } else {
            warn!(
                "{} capture from {} failed: {}",
                self.kind,
                self.target,
                output.output.trim()
            );
        }

        Ok(CaptureOutcome {
            kind: self.kind,
            device_id: self.target.clone(),
            path: destination,
            success: output.success,
            output: output.output,
        })
    }

    fn dump_to_file(&self, runner: &dyn CommandRunner, path: &Path) -> Result<CommandOutput> {
        let command = BridgeCommand::for_text_capture(self.kind)
            .ok_or_else(|| Error::capture(path, format!("{} is not a text capture", self.kind)))?;

        let output = runner.run(&command.args(), Some(&self.target));

        // Written even on failure so the bridge diagnostic is kept
        std::fs::write(path, output.output.as_bytes())
            .map_err(|e| Error::capture(path, format!("cannot write file: {}", e)))?;

        Ok(output)
    }

    fn pull_directory(
        &self,
        runner: &dyn CommandRunner,
        remote: &str,
        dir: &Path,
    ) -> Result<CommandOutput> {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::capture(dir, format!("cannot create directory: {}", e)))?;

        let command = BridgeCommand::pull(remote, dir);
        Ok(runner.run(&command.args(), Some(&self.target)))
    }
}

/// Where a capture landed and what the bridge said
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub kind: CaptureKind,
    pub device_id: String,
    pub path: PathBuf,
    pub success: bool,
    pub output: String,
}

impl CaptureOutcome {
    /// `Saved: <path>` / `Pulled to: <path>`, as an error line on bridge failure
    pub fn console_entry(&self) -> ConsoleEntry {
        let verb = match self.kind.strategy() {
            CaptureStrategy::File => "Saved",
            CaptureStrategy::Directory => "Pulled to",
        };
        let line = format!("{}: {}", verb, self.path.display());

        if self.success {
            ConsoleEntry::info(line)
        } else {
            let reason = self.output.trim();
            if reason.is_empty() {
                ConsoleEntry::error(format!("{} (command failed)", line))
            } else {
                ConsoleEntry::error(format!("{} (command failed: {})", line, reason))
            }
        }
    }
}

/// Runs captures through a shared runner
#[derive(Clone)]
pub struct CaptureOrchestrator {
    runner: Arc<dyn CommandRunner>,
}

impl CaptureOrchestrator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Capture `kind` from `target` into `root`, stamped now
    pub fn capture(&self, kind: CaptureKind, target: &str, root: &Path) -> Result<CaptureOutcome> {
        CaptureRequest::new(kind, target, root)?.execute(self.runner.as_ref())
    }

    pub fn capture_at(
        &self,
        kind: CaptureKind,
        target: &str,
        root: &Path,
        timestamp: DateTime<Local>,
    ) -> Result<CaptureOutcome> {
        CaptureRequest::at(kind, target, root, timestamp)?.execute(self.runner.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use deck_bridge::test_utils::ScriptedRunner;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn orchestrator(runner: ScriptedRunner) -> (CaptureOrchestrator, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        (CaptureOrchestrator::new(runner.clone()), runner)
    }

    #[test]
    fn test_destination_paths() {
        let file = CaptureRequest::at(CaptureKind::Logcat, "10.0.0.2:5555", "/captures", fixed_time())
            .unwrap();
        assert_eq!(file.timestamp_token(), "20240309_140507");
        assert_eq!(
            file.destination(),
            PathBuf::from("/captures/10.0.0.2_5555/20240309_140507_logcat.txt")
        );

        let dir = CaptureRequest::at(CaptureKind::Anr, "SERIAL", "/captures", fixed_time()).unwrap();
        assert_eq!(
            dir.destination(),
            PathBuf::from("/captures/SERIAL/20240309_140507_anr")
        );
    }

    #[test]
    fn test_logcat_writes_single_file() {
        let temp = tempdir().unwrap();
        let (orchestrator, runner) =
            orchestrator(ScriptedRunner::new().respond(CommandOutput::success("I/Tag: hello\n")));

        let outcome = orchestrator
            .capture_at(CaptureKind::Logcat, "ABC", temp.path(), fixed_time())
            .unwrap();

        let expected = temp.path().join("ABC").join("20240309_140507_logcat.txt");
        assert_eq!(outcome.path, expected);
        assert!(outcome.success);
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), "I/Tag: hello\n");

        let entries: Vec<_> = std::fs::read_dir(temp.path().join("ABC")).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let calls = runner.calls();
        assert_eq!(calls[0].argv(), vec!["-s", "ABC", "logcat", "-d"]);
    }

    #[test]
    fn test_dmesg_uses_shell_and_sanitized_dir() {
        let temp = tempdir().unwrap();
        let (orchestrator, runner) = orchestrator(ScriptedRunner::new());

        let outcome = orchestrator
            .capture_at(CaptureKind::Dmesg, "192.168.1.5:5555", temp.path(), fixed_time())
            .unwrap();

        assert_eq!(
            outcome.path,
            temp.path()
                .join("192.168.1.5_5555")
                .join("20240309_140507_dmesg.txt")
        );
        assert_eq!(
            runner.calls()[0].argv(),
            vec!["-s", "192.168.1.5:5555", "shell", "dmesg"]
        );
    }

    #[test]
    fn test_file_written_even_when_bridge_fails() {
        let temp = tempdir().unwrap();
        let (orchestrator, _) = orchestrator(
            ScriptedRunner::new().respond(CommandOutput::failure("error: device offline")),
        );

        let outcome = orchestrator
            .capture_at(CaptureKind::Logcat, "ABC", temp.path(), fixed_time())
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(
            std::fs::read_to_string(&outcome.path).unwrap(),
            "error: device offline"
        );

        let entry = outcome.console_entry();
        assert!(entry.is_error());
        assert!(entry.message.contains("error: device offline"));
    }

    #[test]
    fn test_tombstones_pulls_into_directory() {
        let temp = tempdir().unwrap();
        let (orchestrator, runner) = orchestrator(ScriptedRunner::new());

        let outcome = orchestrator
            .capture_at(CaptureKind::Tombstones, "ABC", temp.path(), fixed_time())
            .unwrap();

        let expected = temp.path().join("ABC").join("20240309_140507_tombstones");
        assert_eq!(outcome.path, expected);
        assert!(expected.is_dir());

        let txt_files = std::fs::read_dir(temp.path().join("ABC"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
            .count();
        assert_eq!(txt_files, 0);

        let calls = runner.calls();
        assert_eq!(
            calls[0].argv(),
            vec![
                "-s".to_string(),
                "ABC".to_string(),
                "pull".to_string(),
                "/data/tombstones".to_string(),
                expected.to_string_lossy().into_owned(),
            ]
        );
        assert_eq!(
            outcome.console_entry().message,
            format!("Pulled to: {}", expected.display())
        );
    }

    #[test]
    fn test_pull_failure_reported_not_raised() {
        let temp = tempdir().unwrap();
        let (orchestrator, _) = orchestrator(ScriptedRunner::new().respond(
            CommandOutput::failure("adb: error: failed to stat remote object '/data/anr'"),
        ));

        let outcome = orchestrator
            .capture_at(CaptureKind::Anr, "ABC", temp.path(), fixed_time())
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.path.is_dir());
    }

    #[test]
    fn test_empty_target_touches_nothing() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("logs");
        let (orchestrator, runner) = orchestrator(ScriptedRunner::new());

        let result = orchestrator.capture(CaptureKind::Logcat, "", &root);

        assert!(matches!(result, Err(Error::NoDeviceSelected)));
        assert!(!root.exists());
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_collision_overwrites() {
        let temp = tempdir().unwrap();
        let (orchestrator, _) = orchestrator(
            ScriptedRunner::new()
                .respond(CommandOutput::success("first"))
                .respond(CommandOutput::success("second")),
        );

        orchestrator
            .capture_at(CaptureKind::Logcat, "ABC", temp.path(), fixed_time())
            .unwrap();
        let outcome = orchestrator
            .capture_at(CaptureKind::Logcat, "ABC", temp.path(), fixed_time())
            .unwrap();

        assert_eq!(std::fs::read_to_string(&outcome.path).unwrap(), "second");
    }

    #[test]
    fn test_unwritable_root_is_capture_error() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let (orchestrator, runner) = orchestrator(ScriptedRunner::new());

        let result = orchestrator.capture_at(CaptureKind::Logcat, "ABC", &blocker, fixed_time());

        assert!(matches!(result, Err(Error::Capture { .. })));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_saved_console_line() {
        let outcome = CaptureOutcome {
            kind: CaptureKind::Logcat,
            device_id: "ABC".to_string(),
            path: PathBuf::from("/captures/ABC/20240309_140507_logcat.txt"),
            success: true,
            output: String::new(),
        };

        let entry = outcome.console_entry();
        assert!(!entry.is_error());
        assert_eq!(
            entry.message,
            "Saved: /captures/ABC/20240309_140507_logcat.txt"
        );
    }
}
