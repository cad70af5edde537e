//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
///
/// Bridge invocations never appear here: a failed `adb` call is reported as a
/// failed `CommandOutput`, not as an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No device selected. Select a device first.")]
    NoDeviceSelected,

    #[error("Invalid network address: {message}")]
    InvalidAddress { message: String },

    #[error("Unknown {what}: {value}")]
    UnknownName { what: &'static str, value: String },

    // ─────────────────────────────────────────────────────────────
    // Mirror Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Mirroring tool not found at: {path}")]
    MissingMirrorBinary { path: PathBuf },

    #[error("Failed to start mirroring tool: {reason}")]
    MirrorSpawn { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Capture Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Capture failed for {path}: {message}")]
    Capture { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Dispatch Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Command lane closed before the result arrived")]
    ChannelClosed,

    #[error("Channel send error: {message}")]
    ChannelSend { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    pub fn unknown_name(what: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownName {
            what,
            value: value.into(),
        }
    }

    pub fn missing_mirror(path: impl Into<PathBuf>) -> Self {
        Self::MissingMirrorBinary { path: path.into() }
    }

    pub fn mirror_spawn(reason: impl Into<String>) -> Self {
        Self::MirrorSpawn {
            reason: reason.into(),
        }
    }

    pub fn capture(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Capture {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors leave the session intact: the user can fix the cause
    /// (select a device, install the tool) and retry the same action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoDeviceSelected
                | Error::MissingMirrorBinary { .. }
                | Error::MirrorSpawn { .. }
                | Error::Capture { .. }
                | Error::InvalidAddress { .. }
                | Error::UnknownName { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::NoDeviceSelected;
        assert!(err.to_string().contains("No device selected"));

        let err = Error::missing_mirror("/opt/scrcpy/scrcpy");
        assert_eq!(
            err.to_string(),
            "Mirroring tool not found at: /opt/scrcpy/scrcpy"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::NoDeviceSelected.is_recoverable());
        assert!(Error::missing_mirror("scrcpy").is_recoverable());
        assert!(Error::capture("/tmp/x", "disk full").is_recoverable());
        assert!(!Error::ChannelClosed.is_recoverable());
        assert!(!Error::config("bad").is_recoverable());
    }

    #[test]
    fn test_unknown_name_message() {
        let err = Error::unknown_name("capture kind", "bugreport");
        assert_eq!(err.to_string(), "Unknown capture kind: bugreport");
    }

    #[test]
    fn test_context_preserves_error() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.context("writing capture").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
