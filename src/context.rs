//! Request-scoped carrier for the current entry and trace identifier.
//!
//! # Responsibilities
//! - Bind one [`Entry`] and one [`TraceId`] per request and hand them to
//!   handler code without threading a logger through every signature
//! - Fuse the trace identifier into the entry on every retrieval, so the
//!   `trace` field is current no matter which binding was attached first
//!
//! # Design Decisions
//! - The carrier is an ordinary value stored in request extensions, not a
//!   task-local; rebinding produces a new value and never mutates a parent
//! - Retrieval from a request that carries no binding is not an error: a
//!   detached entry (hookless logger) is substituted so call sites stay
//!   infallible

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Extensions, Request};

use crate::entry::Entry;
use crate::logger::Logger;
use crate::trace::TraceId;

/// The per-request binding of current [`Entry`] and [`TraceId`].
///
/// Usable directly as an axum extractor:
///
/// ```ignore
/// async fn handler(ctx: LogContext) {
///     ctx.entry().with_field("key", "value").debug("inside handler");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LogContext {
    entry: Entry,
    trace: Option<TraceId>,
}

impl LogContext {
    /// A carrier rooted at the logger's own fields, with no trace bound yet.
    pub fn new(logger: &Logger) -> Self {
        Self {
            entry: logger.entry(),
            trace: None,
        }
    }

    /// A carrier whose emissions go nowhere. Substituted when a request has
    /// no binding, so handler logging stays safe outside the middleware.
    pub fn detached() -> Self {
        Self {
            entry: Logger::builder().build().entry(),
            trace: None,
        }
    }

    /// Rebinds the current entry. The receiver is unchanged.
    pub fn with_entry(&self, entry: Entry) -> Self {
        Self {
            entry,
            trace: self.trace.clone(),
        }
    }

    /// Rebinds the trace identifier. The receiver is unchanged.
    pub fn with_trace(&self, trace: TraceId) -> Self {
        Self {
            entry: self.entry.clone(),
            trace: Some(trace),
        }
    }

    /// The current entry, extended with a `trace` field when a trace
    /// identifier is bound. The fusion happens on every call.
    pub fn entry(&self) -> Entry {
        match &self.trace {
            Some(trace) => self.entry.with_field("trace", trace.as_str()),
            None => self.entry.clone(),
        }
    }

    pub fn trace(&self) -> Option<&TraceId> {
        self.trace.as_ref()
    }

    /// The carrier bound to `req`, or a detached one if none was bound.
    /// A [`TraceId`] extension left by the trace layer is picked up here
    /// when the carrier has no trace of its own.
    pub fn of<B>(req: &Request<B>) -> Self {
        Self::from_extensions(req.extensions())
    }

    fn from_extensions(extensions: &Extensions) -> Self {
        let mut ctx = extensions
            .get::<LogContext>()
            .cloned()
            .unwrap_or_else(Self::detached);
        if ctx.trace.is_none() {
            if let Some(trace) = extensions.get::<TraceId>() {
                ctx.trace = Some(trace.clone());
            }
        }
        ctx
    }
}

impl<S> FromRequestParts<S> for LogContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}
