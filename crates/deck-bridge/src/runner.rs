//! Synchronous bridge invocation
//!
//! Every `adb` call in the application goes through [`CommandRunner::run`].
//! The runner never returns an error: spawn failures and non-zero exits both
//! come back as a failed [`CommandOutput`] carrying the diagnostic text.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use deck_core::prelude::*;

/// Flag pair that scopes a bridge command to one device
pub const DEVICE_FLAG: &str = "-s";

/// `CREATE_NO_WINDOW`: keep console windows from flashing up on Windows
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Normalized result of one bridge invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exited with status zero
    pub success: bool,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }

    /// Trimmed output, or `fallback` when the command printed nothing
    pub fn summary_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let trimmed = self.output.trim();
        if trimmed.is_empty() {
            fallback
        } else {
            trimmed
        }
    }
}

/// Invokes the bridge tool, optionally scoped to a target device
///
/// Implementations are blocking; callers that must stay responsive hand the
/// call to a worker (see `deck_app::dispatch`).
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[String], target: Option<&str>) -> CommandOutput;
}

/// Argument vector after the program: `[-s, target]?` then `args`
///
/// The device flag is only added for a present, non-empty target.
pub fn scoped_args(args: &[String], target: Option<&str>) -> Vec<String> {
    let mut argv = Vec::with_capacity(args.len() + 2);
    if let Some(target) = target.filter(|t| !t.is_empty()) {
        argv.push(DEVICE_FLAG.to_string());
        argv.push(target.to_string());
    }
    argv.extend(args.iter().cloned());
    argv
}

/// [`CommandRunner`] backed by a real `adb` process
#[derive(Debug, Clone)]
pub struct BridgeRunner {
    bridge_path: PathBuf,
}

impl BridgeRunner {
    pub fn new(bridge_path: impl Into<PathBuf>) -> Self {
        Self {
            bridge_path: bridge_path.into(),
        }
    }

    pub fn bridge_path(&self) -> &Path {
        &self.bridge_path
    }

    /// Full invocation including the program, for logging and tests
    pub fn invocation(&self, args: &[String], target: Option<&str>) -> Vec<OsString> {
        let mut argv = vec![self.bridge_path.clone().into_os_string()];
        argv.extend(scoped_args(args, target).into_iter().map(OsString::from));
        argv
    }

    fn command(&self, argv: &[String]) -> Command {
        let mut cmd = Command::new(&self.bridge_path);
        cmd.args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

impl CommandRunner for BridgeRunner {
    fn run(&self, args: &[String], target: Option<&str>) -> CommandOutput {
        let argv = scoped_args(args, target);
        debug!("Running {} {}", self.bridge_path.display(), argv.join(" "));

        let output = match self.command(&argv).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.bridge_path.display(), e);
                return CommandOutput::failure(format!(
                    "Failed to run {}: {}",
                    self.bridge_path.display(),
                    e
                ));
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            debug!(
                "{} exited with code {:?}",
                self.bridge_path.display(),
                output.status.code()
            );
        }

        CommandOutput {
            success: output.status.success(),
            output: text,
        }
    }
}
