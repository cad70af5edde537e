//! Executable discovery for the bridge and mirroring binaries
//!
//! Both tools usually ship together in a versioned bundle directory next to
//! the application. The search order is fixed so every installation layout
//! resolves the same way:
//!
//! 1. `<base>/<bundle>/<name>`
//! 2. `<base>/../<bundle>/<name>`
//! 3. `<base>/<name>`
//! 4. `<name>` (left to the OS `PATH` lookup at spawn time)

use std::path::{Path, PathBuf};

use deck_core::prelude::*;

/// Bundle directory the tools are distributed in
pub const DEFAULT_BUNDLE_DIR: &str = "scrcpy-win64-v1.25";

/// Logical name of the bridge binary
pub const BRIDGE_BINARY: &str = "adb";

/// Logical name of the mirroring binary
pub const MIRROR_BINARY: &str = "scrcpy";

/// Resolves paths to external binaries using an ordered fallback search
#[derive(Debug, Clone)]
pub struct ExecutableLocator {
    base_dir: PathBuf,
    bundle_dir: String,
}

impl ExecutableLocator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_bundle_dir(base_dir, DEFAULT_BUNDLE_DIR)
    }

    pub fn with_bundle_dir(base_dir: impl Into<PathBuf>, bundle_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            bundle_dir: bundle_dir.into(),
        }
    }

    /// Locator rooted at the running executable's directory
    pub fn from_current_exe() -> Self {
        Self::new(app_base_dir())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Candidate paths for `name`, in search order
    ///
    /// `name` is a logical binary name; the platform executable suffix is
    /// appended (`adb` becomes `adb.exe` on Windows).
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let file_name = executable_name(name);
        let mut candidates = vec![self.base_dir.join(&self.bundle_dir).join(&file_name)];

        if let Some(parent) = self.base_dir.parent() {
            candidates.push(parent.join(&self.bundle_dir).join(&file_name));
        }

        candidates.push(self.base_dir.join(&file_name));
        candidates.push(PathBuf::from(file_name));
        candidates
    }

    /// First candidate that exists, else the bare name unchanged
    pub fn locate(&self, name: &str) -> PathBuf {
        let candidates = self.candidates(name);

        for candidate in &candidates {
            if candidate.exists() {
                debug!("Located {} at {}", name, candidate.display());
                return candidate.clone();
            }
        }

        debug!("{} not found in bundle locations, deferring to PATH", name);
        PathBuf::from(executable_name(name))
    }

    pub fn bridge_path(&self) -> PathBuf {
        self.locate(BRIDGE_BINARY)
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.locate(MIRROR_BINARY)
    }
}

/// Directory of the running executable, or the working directory if that
/// cannot be determined
pub fn app_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| dunce::canonicalize(&exe).ok().or(Some(exe)))
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Append the platform executable suffix unless already present
pub fn executable_name(name: &str) -> String {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_candidates_order() {
        let locator = ExecutableLocator::new("/opt/deck/bin");
        let adb = executable_name("adb");
        let candidates = locator.candidates("adb");

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/opt/deck/bin").join(DEFAULT_BUNDLE_DIR).join(&adb),
                PathBuf::from("/opt/deck").join(DEFAULT_BUNDLE_DIR).join(&adb),
                PathBuf::from("/opt/deck/bin").join(&adb),
                PathBuf::from(&adb),
            ]
        );
    }

    #[test]
    fn test_locate_prefers_bundle_under_base() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("app");
        let adb = executable_name("adb");

        let bundled = base.join(DEFAULT_BUNDLE_DIR).join(&adb);
        touch(&bundled);
        touch(&temp.path().join(DEFAULT_BUNDLE_DIR).join(&adb));
        touch(&base.join(&adb));

        let locator = ExecutableLocator::new(&base);
        assert_eq!(locator.locate("adb"), bundled);
    }

    #[test]
    fn test_locate_falls_back_to_parent_bundle() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("app");
        fs::create_dir_all(&base).unwrap();
        let scrcpy = executable_name("scrcpy");

        let sibling = temp.path().join(DEFAULT_BUNDLE_DIR).join(&scrcpy);
        touch(&sibling);
        touch(&base.join(&scrcpy));

        let locator = ExecutableLocator::new(&base);
        assert_eq!(locator.mirror_path(), sibling);
    }

    #[test]
    fn test_locate_falls_back_to_base_dir() {
        let temp = tempdir().unwrap();
        let adb = executable_name("adb");
        let direct = temp.path().join(&adb);
        touch(&direct);

        let locator = ExecutableLocator::new(temp.path());
        assert_eq!(locator.bridge_path(), direct);
    }

    #[test]
    fn test_locate_returns_bare_name_when_missing() {
        let temp = tempdir().unwrap();
        let locator = ExecutableLocator::new(temp.path());
        assert_eq!(
            locator.locate("definitely-not-a-bridge"),
            PathBuf::from(executable_name("definitely-not-a-bridge"))
        );
    }

    #[test]
    fn test_custom_bundle_dir() {
        let temp = tempdir().unwrap();
        let adb = executable_name("adb");
        let bundled = temp.path().join("platform-tools").join(&adb);
        touch(&bundled);

        let locator = ExecutableLocator::with_bundle_dir(temp.path(), "platform-tools");
        assert_eq!(locator.bridge_path(), bundled);
    }

    #[test]
    fn test_executable_name_is_idempotent() {
        let once = executable_name("adb");
        assert_eq!(executable_name(&once), once);
    }
}
