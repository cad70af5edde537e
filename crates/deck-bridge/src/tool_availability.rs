//! Tool availability checking
//!
//! Reports where the bridge and mirroring binaries resolve to and whether
//! they can actually be started, so missing installs show up before the
//! first command fails.

use std::path::{Path, PathBuf};

use deck_core::prelude::*;
use serde::Serialize;

use crate::locator::{ExecutableLocator, BRIDGE_BINARY, MIRROR_BINARY};

/// Resolution result for one external binary
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    /// Logical name (`adb`, `scrcpy`)
    pub name: String,

    /// Path the locator handed out
    pub path: PathBuf,

    /// Executable found on disk or on `PATH`
    pub available: bool,

    /// Absolute location, when one was found
    pub resolved: Option<PathBuf>,
}

impl ToolStatus {
    fn check(name: &str, path: PathBuf) -> Self {
        let resolved = resolve(&path);
        if resolved.is_none() {
            debug!("{} not runnable at {}", name, path.display());
        }

        Self {
            name: name.to_string(),
            available: resolved.is_some(),
            path,
            resolved,
        }
    }
}

/// Availability of both external tools
#[derive(Debug, Clone, Serialize)]
pub struct ToolAvailability {
    pub bridge: ToolStatus,
    pub mirror: ToolStatus,
}

impl ToolAvailability {
    /// Check tool availability using the locator's search order
    pub fn check(locator: &ExecutableLocator) -> Self {
        Self::check_names(locator, BRIDGE_BINARY, MIRROR_BINARY)
    }

    /// Check with configured binary names
    pub fn check_names(locator: &ExecutableLocator, bridge: &str, mirror: &str) -> Self {
        Self {
            bridge: ToolStatus::check(bridge, locator.locate(bridge)),
            mirror: ToolStatus::check(mirror, locator.locate(mirror)),
        }
    }

    /// Get user-friendly message for an unavailable bridge
    pub fn bridge_unavailable_message(&self) -> Option<&'static str> {
        if self.bridge.available {
            None
        } else {
            Some("adb not found. Install Android platform-tools or place adb next to adeck.")
        }
    }

    /// Get user-friendly message for an unavailable mirroring tool
    pub fn mirror_unavailable_message(&self) -> Option<&'static str> {
        if self.mirror.available {
            None
        } else {
            Some("scrcpy not found. Screen mirroring is unavailable.")
        }
    }
}

/// Existing file, or a bare name that `PATH` lookup resolves
fn resolve(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
    }

    if path.components().count() == 1 {
        return which::which(path).ok();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{executable_name, DEFAULT_BUNDLE_DIR};
    use tempfile::tempdir;

    #[test]
    fn test_bundled_tools_are_available() {
        let temp = tempdir().unwrap();
        let bundle = temp.path().join(DEFAULT_BUNDLE_DIR);
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(bundle.join(executable_name("adb")), b"").unwrap();
        std::fs::write(bundle.join(executable_name("scrcpy")), b"").unwrap();

        let tools = ToolAvailability::check(&ExecutableLocator::new(temp.path()));

        assert!(tools.bridge.available);
        assert!(tools.mirror.available);
        assert!(tools.bridge_unavailable_message().is_none());
        assert!(tools.mirror_unavailable_message().is_none());
        assert_eq!(tools.bridge.name, "adb");
    }

    #[test]
    fn test_missing_tools_are_reported() {
        let temp = tempdir().unwrap();
        let locator = ExecutableLocator::new(temp.path());

        let tools =
            ToolAvailability::check_names(&locator, "no-such-bridge-xyz", "no-such-mirror-xyz");

        assert!(!tools.bridge.available);
        assert!(tools.bridge.resolved.is_none());
        assert!(tools.bridge_unavailable_message().is_some());
        assert!(tools.mirror_unavailable_message().is_some());
        assert_eq!(
            tools.bridge.path,
            PathBuf::from(executable_name("no-such-bridge-xyz"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_bare_name_resolves_through_path() {
        // `sh` is on PATH on every unix test host
        assert!(resolve(Path::new("sh")).is_some());
    }

    #[test]
    fn test_relative_missing_path_is_unresolved() {
        assert!(resolve(Path::new("missing-dir/adb")).is_none());
    }
}
