//! Per-request logging for tower/axum services.
//!
//! # Responsibilities
//! - Build the base entry (`serving` sub-object with path, method, query,
//!   host, client address) and bind it, with the request's trace identifier,
//!   into the request extensions before the inner service runs
//! - Observe the response status and emit one Info "HTTP request served"
//!   summary per request, with latency and caller metadata
//! - Exempt the liveness-probe path from summaries
//!
//! # Design Decisions
//! - The response passes through untouched, so protocol upgrades negotiated
//!   by the inner service (websockets, CONNECT) keep working; the status is
//!   read from the response value instead of wrapping a writer
//! - The summary is emitted from the response future on the polling task;
//!   a future dropped before completion (client gone) emits nothing

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderName, Request, Response, StatusCode};
use chrono::{DateTime, SecondsFormat, Utc};
use pin_project_lite::pin_project;
use serde_json::{json, Map, Value};
use tower::{Layer, Service};

use crate::context::LogContext;
use crate::entry::Entry;
use crate::logger::Logger;
use crate::trace::TraceId;

/// Layer applying [`RequestLogService`] around an inner service.
#[derive(Debug, Clone)]
pub struct RequestLogLayer {
    logger: Logger,
    probe_path: String,
}

impl RequestLogLayer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            probe_path: "/up".into(),
        }
    }

    /// Overrides the liveness-probe path exempted from summaries.
    pub fn probe_path(mut self, path: impl Into<String>) -> Self {
        self.probe_path = path.into();
        self
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService {
            inner,
            logger: self.logger.clone(),
            probe_path: self.probe_path.clone(),
        }
    }
}

/// The middleware service built by [`RequestLogLayer`].
#[derive(Debug, Clone)]
pub struct RequestLogService<S> {
    inner: S,
    logger: Logger,
    probe_path: String,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestLogService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let begin = Instant::now();
        let begin_wall = Utc::now();

        let mut ctx = req
            .extensions()
            .get::<LogContext>()
            .cloned()
            .unwrap_or_else(|| LogContext::new(&self.logger));
        if let Some(trace) = req.extensions().get::<TraceId>() {
            ctx = ctx.with_trace(trace.clone());
        }

        let base = ctx.entry().with_field(
            "serving",
            json!({
                "path": req.uri().path(),
                "method": req.method().as_str(),
                "query": query_map(req.uri().query().unwrap_or("")),
                "host": host_of(&req),
                "remote": client_addr(&req),
            }),
        );

        let summary = if req.uri().path() == self.probe_path {
            None
        } else {
            Some(RequestSummary {
                entry: base.clone(),
                begin,
                begin_wall,
                agent: header_str(&req, header::USER_AGENT),
                referer: header_str(&req, header::REFERER),
            })
        };

        req.extensions_mut().insert(ctx.with_entry(base));

        ResponseFuture {
            inner: self.inner.call(req),
            summary,
        }
    }
}

struct RequestSummary {
    entry: Entry,
    begin: Instant,
    begin_wall: DateTime<Utc>,
    agent: String,
    referer: String,
}

impl RequestSummary {
    fn emit(self, status: StatusCode) {
        self.entry
            .with_fields([
                ("statusCode", json!(status.as_u16())),
                ("statusFamily", json!(status_family(status))),
                ("durationSeconds", json!(self.begin.elapsed().as_secs_f64())),
                (
                    "begin",
                    json!(self.begin_wall.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ),
                ("agent", json!(self.agent)),
                ("referer", json!(self.referer)),
            ])
            .info("HTTP request served");
    }
}

pin_project! {
    /// Response future of [`RequestLogService`].
    pub struct ResponseFuture<F> {
        #[pin]
        inner: F,
        summary: Option<RequestSummary>,
    }
}

impl<F, ResBody, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.inner.poll(cx));
        if let Ok(response) = &result {
            if let Some(summary) = this.summary.take() {
                summary.emit(response.status());
            }
        }
        Poll::Ready(result)
    }
}

/// Client address for the `serving.remote` field: a non-empty
/// `X-Forwarded-For` wins over the peer address.
fn client_addr<B>(req: &Request<B>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if !forwarded.is_empty() {
            return forwarded.to_string();
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

fn host_of<B>(req: &Request<B>) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(ToString::to_string))
        .unwrap_or_default()
}

/// Query string as a multimap, one array of values per key.
fn query_map(query: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let slot = map
            .entry(key.into_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(values) = slot {
            values.push(Value::String(value.into_owned()));
        }
    }
    map
}

fn status_family(status: StatusCode) -> String {
    format!("{}XX", status.as_u16() / 100)
}

fn header_str<B>(req: &Request<B>, name: HeaderName) -> String {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
