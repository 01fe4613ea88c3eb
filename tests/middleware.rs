//! End-to-end request logging through a live server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use logware::{Level, LogContext, RequestLogLayer, TraceLayer, TRACE_HEADER};

mod common;

async fn widgets(ctx: LogContext) -> &'static str {
    ctx.entry().with_field("key", "value").debug("inside handler");
    "ok"
}

#[tokio::test]
async fn test_served_request_event_sequence() {
    let (logger, hook) = common::capture_logger(Level::Debug);
    let app = Router::new()
        .route("/widgets", get(widgets))
        .layer(RequestLogLayer::new(logger));
    let addr = common::serve(app).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/widgets?x=1"))
        .header("X-Forwarded-For", "8.8.8.8")
        .header("User-Agent", "TESTAGENT")
        .header(
            "Referer",
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Referer",
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = hook.take();
    assert_eq!(events.len(), 2);

    let serving = json!({
        "path": "/widgets",
        "method": "GET",
        "query": {"x": ["1"]},
        "host": addr.to_string(),
        "remote": "8.8.8.8",
    });

    let inside = &events[0];
    assert_eq!(inside.level, Level::Debug);
    assert_eq!(inside.message, "inside handler");
    assert_eq!(inside.fields["key"], "value");
    assert_eq!(inside.fields["serving"], serving);

    let served = &events[1];
    assert_eq!(served.level, Level::Info);
    assert_eq!(served.message, "HTTP request served");
    assert_eq!(served.fields["statusCode"], 200);
    assert_eq!(served.fields["statusFamily"], "2XX");
    assert_eq!(served.fields["agent"], "TESTAGENT");
    assert_eq!(
        served.fields["referer"],
        "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Referer"
    );
    assert_eq!(served.fields["serving"], serving);
    assert!(served.fields["durationSeconds"].as_f64().unwrap() >= 0.0);
    assert!(served.fields["begin"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_explicit_status_captured() {
    let (logger, hook) = common::capture_logger(Level::Debug);
    let app = Router::new()
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .layer(RequestLogLayer::new(logger));
    let addr = common::serve(app).await;

    let response = reqwest::get(format!("http://{addr}/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let events = hook.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].fields["statusCode"], 404);
    assert_eq!(events[0].fields["statusFamily"], "4XX");
}

#[tokio::test]
async fn test_probe_path_exempt_but_handler_events_flow() {
    let (logger, hook) = common::capture_logger(Level::Debug);
    let app = Router::new()
        .route(
            "/up",
            get(|ctx: LogContext| async move {
                ctx.entry().debug("probe checked");
                "up"
            }),
        )
        .layer(RequestLogLayer::new(logger));
    let addr = common::serve(app).await;

    let response = reqwest::get(format!("http://{addr}/up")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = hook.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "probe checked");
}

#[tokio::test]
async fn test_inbound_trace_reused_in_every_event() {
    let (logger, hook) = common::capture_logger(Level::Debug);
    let app = Router::new()
        .route("/widgets", get(widgets))
        .layer(RequestLogLayer::new(logger))
        .layer(TraceLayer::new());
    let addr = common::serve(app).await;

    reqwest::Client::new()
        .get(format!("http://{addr}/widgets"))
        .header(TRACE_HEADER, "chain-42")
        .send()
        .await
        .unwrap();

    let events = hook.take();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].fields["trace"], "chain-42");
    assert_eq!(events[1].fields["trace"], "chain-42");
}

#[tokio::test]
async fn test_generated_trace_consistent_across_events() {
    let (logger, hook) = common::capture_logger(Level::Debug);
    let app = Router::new()
        .route("/widgets", get(widgets))
        .layer(RequestLogLayer::new(logger))
        .layer(TraceLayer::new());
    let addr = common::serve(app).await;

    reqwest::get(format!("http://{addr}/widgets")).await.unwrap();

    let events = hook.take();
    let trace = events[0].fields["trace"].as_str().unwrap();
    assert_eq!(trace.len(), 36);
    assert_eq!(trace.matches('-').count(), 4);
    assert_eq!(events[1].fields["trace"], trace);
}

#[derive(Debug, Clone, PartialEq)]
struct UpgradeHandle(&'static str);

#[tokio::test]
async fn test_response_passes_through_untouched() {
    let (logger, _hook) = common::capture_logger(Level::Debug);
    let app = Router::new()
        .route(
            "/connect",
            get(|| async {
                let mut response = Response::new(Body::from("switching"));
                *response.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
                response.extensions_mut().insert(UpgradeHandle("conn"));
                response
            }),
        )
        .layer(RequestLogLayer::new(logger));

    let request = Request::builder()
        .uri("/connect")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
    assert_eq!(
        response.extensions().get::<UpgradeHandle>(),
        Some(&UpgradeHandle("conn"))
    );
}
