//! Logging types and configuration.

use serde::{Deserialize, Serialize};

/// Severity threshold for run log output. Ordered so that a configured
/// level admits everything at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Configuration for run logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to output.
    pub level: LogLevel,
    /// Use compact mode (filter stage subprocess chatter, keep tail).
    pub compact: bool,
    /// Number of recent subprocess lines kept for error diagnosis.
    pub error_tail: usize,
    /// Show timestamps in log output.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: 20,
            show_timestamps: true,
        }
    }
}

impl LogConfig {
    /// Verbose configuration with subprocess output passed through.
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            compact: false,
            error_tail: 50,
            show_timestamps: true,
        }
    }
}

/// Callback receiving each formatted log line (console or UI sink).
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Decoration applied to a run log line so stages, commands and
/// outcomes stay scannable in a long log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Spawned stage command, echoed shell-style: `$ command`
    Command,
    /// Stage boundary: `=== Frame ranking ===`
    Phase,
    /// Grouping inside a stage: `--- Allocation ---`
    Section,
    Success,
    Warning,
    Error,
    None,
}

impl MessagePrefix {
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {message}"),
            MessagePrefix::Phase => format!("=== {message} ==="),
            MessagePrefix::Section => format!("--- {message} ---"),
            MessagePrefix::None => message.to_string(),
            tagged => format!("{} {}", tagged.tag(), message),
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            MessagePrefix::Success => "[SUCCESS]",
            MessagePrefix::Warning => "[WARNING]",
            MessagePrefix::Error => "[ERROR]",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn prefixes_format() {
        assert_eq!(MessagePrefix::Phase.format("Clips"), "=== Clips ===");
        assert_eq!(MessagePrefix::Command.format("ffprobe x"), "$ ffprobe x");
    }
}
