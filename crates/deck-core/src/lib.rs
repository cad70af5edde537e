//! # deck-core - Core Domain Types
//!
//! Foundation crate for adb-deck. Provides domain types, error handling and
//! logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Device`] - One row of the bridge's device listing
//! - [`Transport`] - USB or network, derived from the identifier
//! - [`DeviceStatus`] - Connection state token reported by the bridge
//! - [`CaptureKind`] / [`CaptureStrategy`] - Diagnostic retrieval kinds
//! - [`ConsoleEntry`] / [`ConsoleLevel`] - User-visible result lines
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use deck_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all adb-deck crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use error::{Error, Result, ResultExt};
pub use types::{
    sanitize_device_id, CaptureKind, CaptureStrategy, ConsoleEntry, ConsoleLevel, Device,
    DeviceStatus, Transport,
};
