//! Structured logging for tower/axum services: immutable field-chained
//! entries, hook fan-out, trace propagation and per-request summaries.

pub mod config;
pub mod context;
pub mod entry;
pub mod format;
pub mod hook;
pub mod level;
pub mod logger;
pub mod middleware;
pub mod trace;

pub use config::{LogConfig, LogFormat};
pub use context::LogContext;
pub use entry::{Entry, FieldMap};
pub use format::{Formatter, JsonFormatter, MultilineFormatter};
pub use hook::{
    BusEvent, BusHook, CaptureHook, CapturedEvent, Emitter, Hook, HookError, Publisher, WriteHook,
};
pub use level::{Level, ParseLevelError};
pub use logger::{Logger, LoggerBuilder};
pub use middleware::{RequestLogLayer, RequestLogService};
pub use trace::{PropagateTrace, TraceId, TraceLayer, TraceService, TRACE_HEADER};
