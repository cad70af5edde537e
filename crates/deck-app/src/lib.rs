//! # deck-app - Device Session Orchestration
//!
//! Owns the device selection, runs captures, and serializes bridge calls per
//! device. Front ends (the `adeck` CLI) drive everything through [`Engine`].
//!
//! ## Public API
//!
//! ### Engine
//! - [`Engine`] - Owns the session, console, and command lanes
//! - [`EngineEvent`] - Broadcast to subscribers after each state change
//!
//! ### Session
//! - [`SessionManager`] - Selection state machine over a `CommandRunner`
//! - [`PreparedCommand`] - A bridge command bound to its target device
//! - [`RefreshOutcome`], [`NetworkOutcome`] - What a refresh/connect did
//!
//! ### Capture
//! - [`CaptureOrchestrator`], [`CaptureRequest`], [`CaptureOutcome`]
//!
//! ### Supporting Types
//! - [`CommandDispatcher`] - Per-device FIFO lanes on the blocking pool
//! - [`Console`] - Bounded user-visible log
//! - [`config`] - `.adeck/config.toml` and local preferences

pub mod capture;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod engine;
pub mod engine_event;
pub mod session_manager;

pub use capture::{CaptureOrchestrator, CaptureOutcome, CaptureRequest, TIMESTAMP_FORMAT};
pub use config::{Settings, UserPreferences};
pub use console::Console;
pub use dispatch::CommandDispatcher;
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use session_manager::{
    NetworkOutcome, PreparedCommand, RefreshOutcome, Session, SessionManager,
};
