//! Bounded, append-only console log shown to the user

use std::collections::VecDeque;

use deck_core::{ConsoleEntry, ConsoleLevel};

/// User-visible result lines, oldest first
///
/// Once `max_entries` is reached the oldest entry is dropped for each new one.
#[derive(Debug, Clone)]
pub struct Console {
    entries: VecDeque<ConsoleEntry>,
    max_entries: usize,
}

impl Console {
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries.min(256)),
            max_entries,
        }
    }

    /// Append an entry, returning a copy for broadcasting
    pub fn push(&mut self, entry: ConsoleEntry) -> ConsoleEntry {
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    pub fn info(&mut self, message: impl Into<String>) -> ConsoleEntry {
        self.push(ConsoleEntry::new(ConsoleLevel::Info, message))
    }

    pub fn error(&mut self, message: impl Into<String>) -> ConsoleEntry {
        self.push(ConsoleEntry::new(ConsoleLevel::Error, message))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ConsoleEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(ConsoleEntry::is_error)
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
