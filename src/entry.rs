//! The chainable log entry.
//!
//! # Responsibilities
//! - Carry an immutable field map plus a handle to the owning [`Logger`]
//! - Extend the field map functionally (`with_field`/`with_fields`)
//! - Emit events at a given level through the logger's dispatch
//!
//! # Design Decisions
//! - Extension clones the parent map and merges; siblings derived from a
//!   common ancestor can never observe each other's fields
//! - Values are `serde_json::Value`, so anything the `json!` macro can build
//!   is a valid field

use serde_json::Value;

use crate::level::Level;
use crate::logger::Logger;

/// Field storage shared by entries, hooks and formatters.
pub type FieldMap = serde_json::Map<String, Value>;

/// An immutable bundle of structured fields bound to a [`Logger`].
///
/// Entries are cheap to derive and are meant to be chained:
///
/// ```
/// use logware::Logger;
///
/// let logger = Logger::builder().build();
/// let entry = logger.with_field("request_id", "r-1");
/// entry.with_field("attempt", 2).info("retrying upstream");
/// ```
#[derive(Debug, Clone)]
pub struct Entry {
    logger: Logger,
    fields: FieldMap,
}

impl Entry {
    pub(crate) fn new(logger: Logger, fields: FieldMap) -> Self {
        Self { logger, fields }
    }

    /// Returns a new entry with `key` set to `value`. The receiver is
    /// unchanged.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Entry {
        let mut fields = self.fields.clone();
        fields.insert(key.into(), value.into());
        Entry::new(self.logger.clone(), fields)
    }

    /// Returns a new entry with every pair in `fields` merged in. Supplied
    /// keys override same-named parent keys; all other parent keys are kept.
    pub fn with_fields<K, V, I>(&self, fields: I) -> Entry
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut merged = self.fields.clone();
        for (key, value) in fields {
            merged.insert(key.into(), value.into());
        }
        Entry::new(self.logger.clone(), merged)
    }

    /// The current field snapshot.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Sends (level, message, fields) to the owning logger. Never mutates
    /// the entry.
    pub fn emit(&self, level: Level, message: &str) {
        self.logger.dispatch(level, message, &self.fields);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn track(&self, message: &str) {
        self.emit(Level::Track, message);
    }
}
