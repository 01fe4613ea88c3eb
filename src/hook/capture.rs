use std::sync::{Arc, Mutex, PoisonError};

use crate::entry::FieldMap;
use crate::level::Level;

use super::{Hook, HookError};

/// One event as seen by a [`CaptureHook`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: FieldMap,
}

/// Records every delivered event in memory. Meant for tests that assert on
/// what a logger emitted.
#[derive(Clone, Default)]
pub struct CaptureHook {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything captured so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains and returns the captured events.
    pub fn take(&self) -> Vec<CapturedEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Hook for CaptureHook {
    fn write(&self, level: Level, message: &str, fields: &FieldMap) -> Result<(), HookError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                level,
                message: message.to_string(),
                fields: fields.clone(),
            });
        Ok(())
    }
}
