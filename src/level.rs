//! Severity levels and their total order.
//!
//! One ordering is used everywhere: `Debug < Info < Warn < Error < Track`.
//! Filtering passes an event when `level >= min_level`, which makes `Track`
//! the always-emitted sentinel and `Debug` the first level dropped.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Diagnostic detail, dropped by most configurations.
    Debug,
    /// Routine operational events.
    Info,
    /// Something unexpected that the process recovered from.
    Warn,
    /// A failed operation.
    Error,
    /// Audit-grade events that must always be recorded and are eligible
    /// for event-bus republishing.
    Track,
}

impl Level {
    /// Wire name used by formatters and the bus schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Track => "track",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "track" => Ok(Level::Track),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
