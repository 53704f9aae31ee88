//! Bounded operator-facing event log.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStatus {
    /// A user-visible action succeeded.
    Ok,
    /// Something failed.
    Error,
}

impl LogStatus {
    /// Returns the tag shown to the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Ok => "OK",
            LogStatus::Error => "Error",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped status message.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Severity.
    pub status: LogStatus,
    /// Local time the entry was created.
    pub timestamp: DateTime<Local>,
    /// Message text, without the timestamp.
    pub message: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current local time.
    pub fn new(status: LogStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            timestamp: Local::now(),
            message: message.into(),
        }
    }

    /// Creates an `OK` entry.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(LogStatus::Ok, message)
    }

    /// Creates an `Error` entry.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogStatus::Error, message)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Newest-first log that drops its oldest entries past `capacity`.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends an entry and prunes the tail.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Iterates entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Returns the newest entry.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Returns the number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first() {
        let mut log = EventLog::new(5);
        log.push(LogEntry::ok("first"));
        log.push(LogEntry::error("second"));

        let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(log.latest().unwrap().status, LogStatus::Error);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut log = EventLog::new(5);
        for i in 0..12 {
            log.push(LogEntry::ok(format!("entry {i}")));
            assert!(log.len() <= 5);
        }
        assert_eq!(log.len(), 5);
        assert_eq!(log.latest().unwrap().message, "entry 11");
        assert_eq!(log.iter().last().unwrap().message, "entry 7");
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut log = EventLog::new(0);
        log.push(LogEntry::ok("dropped"));
        assert!(log.is_empty());
    }

    #[test]
    fn entry_display_has_timestamp_prefix() {
        let entry = LogEntry::ok("Sent config OK");
        let text = entry.to_string();
        assert!(text.ends_with(": Sent config OK"));
        assert_eq!(text.len(), "HH:MM:SS: Sent config OK".len());
        assert_eq!(LogStatus::Ok.to_string(), "OK");
        assert_eq!(LogStatus::Error.to_string(), "Error");
    }
}
