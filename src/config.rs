//! Environment-driven logger bootstrapping.
//!
//! # Responsibilities
//! - Translate `VERBOSE`, `LOG_LEVEL` and `LOG_FORMAT` into a [`LogConfig`]
//! - Build the conventional stderr [`Logger`] for that configuration
//!
//! # Design Decisions
//! - `LogConfig` is a plain value; applications construct it directly in
//!   tests and call [`LogConfig::from_env`] only at startup, so nothing here
//!   is a process-wide singleton

use std::env;

use crate::format::{JsonFormatter, MultilineFormatter};
use crate::hook::WriteHook;
use crate::level::Level;
use crate::logger::Logger;

/// Output format of the default stderr hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Colorized multi-line blocks for terminals.
    Multiline,
}

/// Minimum level and formatter selection for a stock logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: LogFormat::Json,
        }
    }
}

impl LogConfig {
    /// Reads `VERBOSE` (`true` forces level Debug), `LOG_LEVEL` (a level
    /// name, default `info`) and `LOG_FORMAT` (`json` or `multiline`, with
    /// `pretty` accepted for `multiline`; default `json`).
    pub fn from_env() -> Self {
        Self::resolve(
            env::var("VERBOSE").ok().as_deref(),
            env::var("LOG_LEVEL").ok().as_deref(),
            env::var("LOG_FORMAT").ok().as_deref(),
        )
    }

    fn resolve(verbose: Option<&str>, level: Option<&str>, format: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(name) = level {
            if let Ok(parsed) = name.parse() {
                config.level = parsed;
            }
        }
        if verbose == Some("true") {
            config.level = Level::Debug;
        }
        config.format = match format {
            Some("multiline") | Some("pretty") => LogFormat::Multiline,
            _ => LogFormat::Json,
        };
        config
    }

    /// A logger writing to stderr with this configuration.
    pub fn build(self) -> Logger {
        let builder = Logger::builder().min_level(self.level);
        match self.format {
            LogFormat::Json => builder.hook(WriteHook::stderr(JsonFormatter)).build(),
            LogFormat::Multiline => builder
                .hook(WriteHook::stderr(MultilineFormatter::default()))
                .build(),
        }
    }
}
