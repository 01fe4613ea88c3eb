//! Logger construction and hook dispatch.
//!
//! # Responsibilities
//! - Own the root field map, the minimum level and the ordered hook list
//! - Filter events below the minimum level before any hook sees them
//! - Fan every surviving event out to all hooks, in registration order
//!
//! # Design Decisions
//! - `Logger` is an `Arc` handle: clone freely, inject once at startup
//! - The hook list sits behind a read-mostly `RwLock` so `add_hook` is safe
//!   even while other threads are emitting
//! - A hook error is swallowed and the remaining hooks still run; emitting a
//!   log line must never fail the caller

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::entry::{Entry, FieldMap};
use crate::hook::Hook;
use crate::level::Level;

struct Inner {
    root: FieldMap,
    min_level: Level,
    hooks: RwLock<Vec<Box<dyn Hook>>>,
}

/// Routes log events to a set of [`Hook`]s.
///
/// Construct one per process with [`Logger::builder`] (or
/// [`LogConfig::build`](crate::LogConfig::build)) and hand clones to whatever
/// needs to emit.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// A fresh entry carrying only the root fields.
    pub fn entry(&self) -> Entry {
        Entry::new(self.clone(), self.inner.root.clone())
    }

    /// Starts a field chain from the root fields.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Entry {
        self.entry().with_field(key, value)
    }

    /// Starts a field chain from the root fields with a whole mapping.
    pub fn with_fields<K, V, I>(&self, fields: I) -> Entry
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.entry().with_fields(fields)
    }

    /// Appends a hook to the dispatch list. Existing hooks are never removed
    /// or reordered.
    pub fn add_hook<H: Hook + 'static>(&self, hook: H) {
        self.inner
            .hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    /// The configured minimum level; events below it never reach a hook.
    pub fn min_level(&self) -> Level {
        self.inner.min_level
    }

    pub(crate) fn dispatch(&self, level: Level, message: &str, fields: &FieldMap) {
        if level < self.inner.min_level {
            return;
        }
        let hooks = self
            .inner
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for hook in hooks.iter() {
            // A failed sink is not retried and must not stop the others.
            let _ = hook.write(level, message, fields);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self
            .inner
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Logger")
            .field("min_level", &self.inner.min_level)
            .field("hooks", &hooks.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    root: FieldMap,
    min_level: Level,
    hooks: Vec<Box<dyn Hook>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            root: FieldMap::new(),
            min_level: Level::Info,
            hooks: Vec::new(),
        }
    }
}

impl LoggerBuilder {
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Adds a root field (static metadata such as the application name)
    /// present on every entry derived from this logger.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.root.insert(key.into(), value.into());
        self
    }

    pub fn fields<K, V, I>(mut self, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in fields {
            self.root.insert(key.into(), value.into());
        }
        self
    }

    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            inner: Arc::new(Inner {
                root: self.root,
                min_level: self.min_level,
                hooks: RwLock::new(self.hooks),
            }),
        }
    }
}
