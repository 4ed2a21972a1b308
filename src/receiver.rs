/// Local receiver for browser-data reports
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::info;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tower_http::cors::CorsLayer;

/// Address the receiver binds by default; matches `DEFAULT_ENDPOINT`
pub const DEFAULT_RECEIVER_ADDR: &str = "127.0.0.1:5000";

pub const REPORT_PATH: &str = "/browser-data";

/// Shared receiver state: the most recent report and an optional sink
/// that sees every report.
#[derive(Clone, Default)]
pub struct ReceiverState {
    latest: Arc<RwLock<Option<Value>>>,
    sink: Option<UnboundedSender<Value>>,
}

impl ReceiverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: UnboundedSender<Value>) -> Self {
        ReceiverState {
            latest: Arc::default(),
            sink: Some(sink),
        }
    }

    /// Last report received, if any
    pub async fn latest(&self) -> Option<Value> {
        self.latest.read().await.clone()
    }
}

/// Build the router. `POST` stores and logs a report, `GET` returns the
/// latest one. Any origin may call it.
pub fn router(state: ReceiverState) -> Router {
    Router::new()
        .route(REPORT_PATH, post(browser_data).get(latest_browser_data))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Receiving browser data on http://{}{}", addr, REPORT_PATH);
    }
    axum::serve(listener, router).await
}

async fn browser_data(
    State(state): State<ReceiverState>,
    Json(data): Json<Value>,
) -> (StatusCode, &'static str) {
    info!("Received browser data: {}", data);
    *state.latest.write().await = Some(data.clone());
    if let Some(sink) = &state.sink {
        // A closed sink only means nobody is listening any more
        let _ = sink.send(data);
    }
    (StatusCode::OK, "OK")
}

async fn latest_browser_data(State(state): State<ReceiverState>) -> Response {
    match state.latest().await {
        Some(data) => Json(data).into_response(),
        None => (StatusCode::NOT_FOUND, "No browser data received yet").into_response(),
    }
}
