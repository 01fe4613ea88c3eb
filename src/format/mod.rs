//! Rendering of log events into bytes.
//!
//! # Responsibilities
//! - Define the [`Formatter`] seam between dispatch and presentation
//! - Provide the machine-readable [`JsonFormatter`] and the human-oriented
//!   [`MultilineFormatter`]
//!
//! # Design Decisions
//! - A formatter writes directly into a caller-supplied sink instead of
//!   returning a buffer; the sink decides about locking and flushing

use std::io;

use crate::entry::FieldMap;
use crate::hook::HookError;
use crate::level::Level;

mod json;
mod multiline;

pub use json::JsonFormatter;
pub use multiline::MultilineFormatter;

/// Renders one log event into `out`.
///
/// Implementations append exactly one event per call, including any trailing
/// newline, so interleaved writers stay line-atomic.
pub trait Formatter: Send + Sync {
    fn format(
        &self,
        out: &mut dyn io::Write,
        level: Level,
        message: &str,
        fields: &FieldMap,
    ) -> Result<(), HookError>;
}
