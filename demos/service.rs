//! Demo service wiring the whole stack: env-configured logger, bus hook,
//! trace propagation in and out, and per-request summaries.
//!
//! Run with:
//!     LOG_FORMAT=multiline VERBOSE=true cargo run --example service
//!
//! Then try:
//!     curl -H 'X-Trace-ID: demo-1' http://127.0.0.1:8080/widgets
//!     curl http://127.0.0.1:8080/relay
//!     curl http://127.0.0.1:8080/up

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::json;
use tower::{service_fn, ServiceExt};

use logware::{
    BusEvent, BusHook, LogConfig, LogContext, PropagateTrace, Publisher, RequestLogLayer,
    TraceLayer, TRACE_HEADER,
};

/// Prints every bus event to stdout instead of posting it anywhere.
struct StdoutPublisher;

impl Publisher for StdoutPublisher {
    fn publish(
        &self,
        event: &BusEvent,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        println!("{}", serde_json::to_string(event)?);
        Ok(event.name.clone())
    }
}

#[derive(Clone)]
struct AppState {
    upstream: Client<HttpConnector, Body>,
    target: String,
}

async fn list_widgets(ctx: LogContext) -> impl IntoResponse {
    let entry = ctx.entry().with_field("widget_count", 2);
    entry.debug("loading widgets");
    entry.with_field("widget_id", "w-1").track("widgets.listed");
    Json(json!({"widgets": ["w-1", "w-2"]}))
}

/// What the upstream sees: the trace header injected by [`PropagateTrace`].
async fn echo_trace(headers: HeaderMap) -> impl IntoResponse {
    let seen = headers
        .get(TRACE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none")
        .to_string();
    Json(json!({"seen_trace": seen}))
}

async fn relay(State(state): State<AppState>, ctx: LogContext) -> axum::response::Response {
    let mut req = Request::builder()
        .uri(format!("{}/answer", state.target))
        .body(Body::empty())
        .unwrap();
    if let Some(trace) = ctx.trace() {
        req.extensions_mut().insert(trace.clone());
    }

    let client = state.upstream.clone();
    let upstream = PropagateTrace::new(service_fn(move |req| client.request(req)));
    match upstream.oneshot(req).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(err) => {
            ctx.entry()
                .with_field("error", err.to_string())
                .error("relay to upstream failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

#[tokio::main]
async fn main() {
    let logger = LogConfig::from_env().build();
    logger.add_hook(BusHook::new(StdoutPublisher, "widget-service", "1.1"));

    // A second in-process server stands in for a downstream dependency.
    let upstream_app = Router::new().route("/answer", get(echo_trace));
    let upstream_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream_listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(upstream_listener, upstream_app).await.unwrap();
    });

    let state = AppState {
        upstream: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        target: format!("http://{upstream_addr}"),
    };

    let app = Router::new()
        .route("/widgets", get(list_widgets))
        .route("/relay", get(relay))
        .route("/up", get(|| async { "up" }))
        .with_state(state)
        .layer(RequestLogLayer::new(logger))
        .layer(TraceLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    println!("widget service listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
