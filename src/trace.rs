//! Distributed trace identifiers and their propagation.
//!
//! # Responsibilities
//! - Reuse an inbound `X-Trace-ID` header, or mint a fresh identifier when
//!   none arrives, and bind it to the request before handlers run
//! - Re-inject the bound identifier into outbound requests so the chain
//!   stays correlated across services
//!
//! # Design Decisions
//! - The identifier is an opaque string; inbound values are trusted verbatim
//!   so an upstream proxy's scheme survives intact
//! - Outbound propagation reads the [`TraceId`] from the outbound request's
//!   own extensions; the caller copies it there from its
//!   [`LogContext`](crate::LogContext) before dispatch

use std::fmt;
use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the trace identifier in both directions.
pub const TRACE_HEADER: &str = "x-trace-id";

/// Opaque correlation token for one logical request chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// A fresh UUIDv4 identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TraceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TraceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Layer applying [`TraceService`] to inbound requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceLayer;

impl TraceLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TraceLayer {
    type Service = TraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceService { inner }
    }
}

/// Binds a [`TraceId`] to every inbound request: the `X-Trace-ID` header
/// value when present and non-empty, a generated one otherwise.
#[derive(Debug, Clone)]
pub struct TraceService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for TraceService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let trace = req
            .headers()
            .get(TRACE_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(TraceId::from)
            .unwrap_or_else(TraceId::generate);
        req.extensions_mut().insert(trace);
        self.inner.call(req)
    }
}

/// Outbound counterpart of [`TraceService`]: wraps a client service and sets
/// `X-Trace-ID` on each request that carries a [`TraceId`] extension.
#[derive(Debug, Clone)]
pub struct PropagateTrace<S> {
    inner: S,
}

impl<S> PropagateTrace<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S, B> Service<Request<B>> for PropagateTrace<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let trace = req.extensions().get::<TraceId>().cloned();
        if let Some(trace) = trace {
            if let Ok(value) = HeaderValue::from_str(trace.as_str()) {
                req.headers_mut().insert(TRACE_HEADER, value);
            }
        }
        self.inner.call(req)
    }
}
