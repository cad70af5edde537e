//! adb-deck Library
//!
//! Command-line front end over `deck-app`: argument handling, text rendering
//! and NDJSON event output.

pub mod cli;
pub mod headless;

pub use cli::{run, Command};
