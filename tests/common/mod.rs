//! Shared helpers for the integration tests.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use logware::{CaptureHook, Level, Logger};

/// A logger delivering every event to the returned capture hook.
pub fn capture_logger(min_level: Level) -> (Logger, CaptureHook) {
    let hook = CaptureHook::new();
    let logger = Logger::builder()
        .min_level(min_level)
        .hook(hook.clone())
        .build();
    (logger, hook)
}

/// Binds an ephemeral port and serves `app` in the background.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}
