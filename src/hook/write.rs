use std::io;
use std::sync::{Mutex, PoisonError};

use crate::entry::FieldMap;
use crate::format::Formatter;
use crate::level::Level;

use super::{Hook, HookError};

/// Formats each event and appends it to a byte sink.
///
/// The sink sits behind a mutex so one event's bytes are never interleaved
/// with another's.
pub struct WriteHook {
    formatter: Box<dyn Formatter>,
    sink: Mutex<Box<dyn io::Write + Send>>,
}

impl WriteHook {
    pub fn new<F, W>(formatter: F, sink: W) -> Self
    where
        F: Formatter + 'static,
        W: io::Write + Send + 'static,
    {
        Self {
            formatter: Box::new(formatter),
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// The conventional destination for log output.
    pub fn stderr<F: Formatter + 'static>(formatter: F) -> Self {
        Self::new(formatter, io::stderr())
    }

    pub fn stdout<F: Formatter + 'static>(formatter: F) -> Self {
        Self::new(formatter, io::stdout())
    }
}

impl Hook for WriteHook {
    fn write(&self, level: Level, message: &str, fields: &FieldMap) -> Result<(), HookError> {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        self.formatter.format(&mut **sink, level, message, fields)
    }
}
