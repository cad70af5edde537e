//! Test utilities for bridge types
//!
//! Provides a scripted [`CommandRunner`] and helpers for building device
//! listings.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::runner::{scoped_args, CommandOutput, CommandRunner};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub args: Vec<String>,
    pub target: Option<String>,
}

impl RecordedCall {
    /// Arguments as the real bridge would receive them (`-s` included)
    pub fn argv(&self) -> Vec<String> {
        scoped_args(&self.args, self.target.as_deref())
    }
}

/// Runner that replays queued outputs and records every call
///
/// Calls beyond the queued responses get an empty successful result.
#[derive(Debug)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<CommandOutput>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for the next call
    pub fn respond(self, output: CommandOutput) -> Self {
        self.push(output);
        self
    }

    pub fn push(&self, output: CommandOutput) {
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .push_back(output);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, args: &[String], target: Option<&str>) -> CommandOutput {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(RecordedCall {
                args: args.to_vec(),
                target: target.map(str::to_string),
            });

        self.responses
            .lock()
            .expect("responses lock poisoned")
            .pop_front()
            .unwrap_or_else(|| CommandOutput::success(""))
    }
}

/// `adb devices -l` output for the given `(id, status)` rows
pub fn device_listing(rows: &[(&str, &str)]) -> String {
    let mut out = String::from("List of devices attached\n");
    for (id, status) in rows {
        out.push_str(&format!("{}\t{}\n", id, status));
    }
    out.push('\n');
    out
}
