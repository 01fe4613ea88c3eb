//! Log event sinks.
//!
//! # Responsibilities
//! - Define the [`Hook`] contract every sink implements
//! - Provide the stock sinks: formatted stream output ([`WriteHook`]),
//!   event-bus republishing ([`BusHook`]) and in-memory capture for tests
//!   ([`CaptureHook`])
//!
//! # Design Decisions
//! - `write` returns a [`HookError`] so a sink can report failure, but the
//!   dispatching [`Logger`](crate::Logger) swallows it; callers of the log
//!   API never see sink errors

use thiserror::Error;

use crate::entry::FieldMap;
use crate::level::Level;

mod bus;
mod capture;
mod write;

pub use bus::{BusEvent, BusHook, Emitter, Publisher};
pub use capture::{CaptureHook, CapturedEvent};
pub use write::WriteHook;

/// Errors a sink can hit while handling one event.
#[derive(Debug, Error)]
pub enum HookError {
    /// A field value or the assembled record could not be serialized.
    #[error("failed to encode log event: {0}")]
    Encode(#[from] serde_json::Error),

    /// The underlying stream rejected the write.
    #[error("failed to write log event: {0}")]
    Io(#[from] std::io::Error),

    /// The event-bus publisher rejected the event.
    #[error("failed to publish event: {0}")]
    Publish(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A sink receiving every event that passes the logger's level filter.
///
/// Hooks run sequentially on the emitting thread, in registration order.
/// An error from one hook does not stop the others.
pub trait Hook: Send + Sync {
    fn write(&self, level: Level, message: &str, fields: &FieldMap) -> Result<(), HookError>;
}
