pub mod error;
pub mod extractors;
pub mod metrics;
pub mod stores;
pub mod surveys;

use anyhow::Result;
use axum::http::HeaderMap;
use axum::{routing::get, Json, Router};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Settings;
use crate::outbound::{ClickLog, ClickRequest};

use metrics::SharedClickLog;
use stores::SharedStores;
use surveys::{SharedSurveys, SurveyState};

/// Shared state for every route group.
#[derive(Clone)]
pub struct AppState {
    pub clicks: SharedClickLog,
    pub surveys: SharedSurveys,
    pub stores: SharedStores,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            clicks: Arc::new(Mutex::new(ClickLog::new())),
            surveys: Arc::new(SurveyState::new(Arc::new(settings))),
            stores: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

/// Submitted surveys kept in memory before the oldest are dropped
pub const MAX_SURVEYS: usize = 10_000;

/// Registered stores kept in memory before the oldest are dropped
pub const MAX_STORES: usize = 10_000;

/// Append `item`, dropping from the front so at most `capacity` remain.
pub(crate) fn push_bounded<T>(items: &mut VecDeque<T>, item: T, capacity: usize) {
    while items.len() >= capacity.max(1) {
        items.pop_front();
    }
    items.push_back(item);
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The request headers that identify a visitor.
pub(crate) fn client_request(headers: &HeaderMap) -> ClickRequest {
    ClickRequest {
        cookie: header(headers, "cookie"),
        referer: header(headers, "referer"),
        user_agent: header(headers, "user-agent"),
        cf_connecting_ip: header(headers, "cf-connecting-ip"),
        forwarded_for: header(headers, "x-forwarded-for"),
    }
}

pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(metrics::routes(state.clicks.clone()))
        .merge(surveys::routes(state.surveys.clone()))
        .merge(stores::routes(state.stores.clone()))
        .layer(CorsLayer::permissive())
}

pub fn run_server(settings: Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(start_server_async(settings))
}

/// Async version of `run_server` for embedding in an existing tokio runtime.
pub async fn start_server_async(settings: Settings) -> Result<()> {
    let port = settings.port;
    let state = AppState::new(settings);
    let app = router(&state);

    let listener = bind_with_reuse(port).await?;
    info!(port, "API server listening");
    println!("Makoto API running at http://localhost:{}", port);
    if let Some(ip) = local_ip() {
        println!("  Network: http://{}:{}", ip, port);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "version": crate::VERSION }))
}

/// Bind a TCP listener with SO_REUSEADDR so restarts reclaim the port instantly.
async fn bind_with_reuse(port: u16) -> Result<tokio::net::TcpListener> {
    let addr: std::net::SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let socket = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(tokio::net::TcpListener::from_std(std_listener)?)
}

/// Detect the machine's LAN IP address by opening a UDP socket to a public address.
fn local_ip() -> Option<std::net::IpAddr> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|a| a.ip())
}
