//! # deck-bridge - adb Process Management
//!
//! Locates the external tools, invokes the bridge synchronously, parses its
//! device listing, and launches the mirroring tool.
//!
//! Depends on [`deck_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Executable Discovery
//! - [`ExecutableLocator`] - Ordered fallback search for `adb` / `scrcpy`
//! - [`ToolAvailability`] - Whether each tool can actually be started
//!
//! ### Command Execution
//! - [`CommandRunner`] - Blocking bridge invocation returning a [`CommandOutput`]
//! - [`BridgeRunner`] - Process-backed runner
//! - [`BridgeCommand`], [`DeviceAction`], [`NetworkAddress`] - Command vocabulary
//!
//! ### Device Discovery
//! - [`parse_device_list()`] - Parse `adb devices -l` output
//! - [`DeviceList`] - Parsed devices plus skipped-line count
//!
//! ### Mirroring
//! - [`MirrorLauncher`] - Detached `scrcpy -s <id>` spawn

pub mod commands;
pub mod devices;
pub mod locator;
pub mod mirror;
pub mod runner;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;

// Public API re-exports
pub use commands::{BridgeCommand, DeviceAction, NetworkAddress, DEFAULT_ADB_PORT};
pub use devices::{find_device, parse, parse_device_list, DeviceList, LIST_DEVICES_ARGS};
pub use locator::{
    app_base_dir, executable_name, ExecutableLocator, BRIDGE_BINARY, DEFAULT_BUNDLE_DIR,
    MIRROR_BINARY,
};
pub use mirror::MirrorLauncher;
pub use runner::{scoped_args, BridgeRunner, CommandOutput, CommandRunner, DEVICE_FLAG};
pub use tool_availability::{ToolAvailability, ToolStatus};
