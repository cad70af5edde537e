//! Screen mirroring launch
//!
//! The mirroring tool is fire-and-forget: it is spawned detached from its own
//! directory with output discarded, and nothing waits for it to exit.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use deck_core::prelude::*;

use crate::runner::DEVICE_FLAG;

/// `CREATE_NEW_CONSOLE`: give the mirror its own console on Windows
#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

/// Spawns the mirroring tool for a device
#[derive(Debug, Clone)]
pub struct MirrorLauncher {
    mirror_path: PathBuf,
}

impl MirrorLauncher {
    pub fn new(mirror_path: impl Into<PathBuf>) -> Self {
        Self {
            mirror_path: mirror_path.into(),
        }
    }

    pub fn mirror_path(&self) -> &Path {
        &self.mirror_path
    }

    /// Arguments passed to the mirroring tool
    pub fn args(target: &str) -> [&str; 2] {
        [DEVICE_FLAG, target]
    }

    /// Launch the mirror for `target`, returning the child's PID
    ///
    /// Fails with [`Error::MissingMirrorBinary`] when the resolved path does
    /// not exist; the spawn is never attempted in that case.
    pub fn launch(&self, target: &str) -> Result<u32> {
        if target.is_empty() {
            return Err(Error::NoDeviceSelected);
        }
        if !self.mirror_path.exists() {
            return Err(Error::missing_mirror(&self.mirror_path));
        }

        // Absolute program path: a relative one would be resolved against the
        // new working directory on some platforms.
        let program =
            dunce::canonicalize(&self.mirror_path).unwrap_or_else(|_| self.mirror_path.clone());

        let mut cmd = Command::new(&program);
        cmd.args(Self::args(target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = working_dir(&program) {
            cmd.current_dir(dir);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NEW_CONSOLE);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::mirror_spawn(format!("{}: {}", self.mirror_path.display(), e)))?;

        let pid = child.id();
        info!("Mirror started for {} (pid {})", target, pid);

        // Detach: reap the child whenever it exits, nobody waits on it
        std::thread::spawn(move || {
            let _ = child.wait();
        });

        Ok(pid)
    }
}

/// Directory containing the mirror binary, if it has one
fn working_dir(program: &Path) -> Option<&Path> {
    program.parent().filter(|dir| !dir.as_os_str().is_empty())
}
