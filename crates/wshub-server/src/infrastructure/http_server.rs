//! HTTP server: the upgrade endpoint, the operational endpoints, and the
//! bind/serve lifecycle.
//!
//! # Routes
//!
//! | Path          | Response                                          |
//! |---------------|---------------------------------------------------|
//! | `{prefix}ws`  | WebSocket upgrade; the socket joins the hub       |
//! | `/`           | Minimal HTML chat client                          |
//! | `/health`     | `200` with an empty body                          |
//! | `/version`    | `version: X (built at D)`, or `200` empty         |

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::application::{run_connection, Hub, HubHandle};
use crate::domain::{ConnectionLimits, ServerConfig};
use crate::infrastructure::ws_adapter::split_socket;

/// Build date embedded at compile time, e.g. `WSHUB_BUILD_DATE=2024-05-01`.
const BUILD_DATE: Option<&str> = option_env!("WSHUB_BUILD_DATE");

const INDEX_TEMPLATE: &str = include_str!("index.html");

/// Shared state handed to every request handler.
#[derive(Clone)]
struct AppState {
    hub: HubHandle,
    limits: ConnectionLimits,
    index_page: Arc<str>,
}

/// Builds the router for `config`, relaying through `hub`.
pub fn router(config: &ServerConfig, hub: HubHandle, limits: ConnectionLimits) -> Router {
    let ws_path = config.ws_path();
    let state = AppState {
        hub,
        limits,
        index_page: render_index(&ws_path).into(),
    };
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/version", get(version))
        .route(&ws_path, get(upgrade))
        .with_state(state)
}

async fn upgrade(
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!("upgrade rejected: {rejection}");
            return rejection.into_response();
        }
    };
    let AppState { hub, limits, .. } = state;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_message_size)
        .on_failed_upgrade(|e: axum::Error| warn!("upgrade failed: {e}"))
        .on_upgrade(move |socket: WebSocket| async move {
            let (stream, sink) = split_socket(socket);
            run_connection(stream, sink, hub, limits).await;
        })
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.index_page.to_string())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn version() -> Response {
    match version_line(env!("CARGO_PKG_VERSION"), BUILD_DATE) {
        Some(line) => line.into_response(),
        None => StatusCode::OK.into_response(),
    }
}

/// The `/version` body, or `None` when either part is missing.
fn version_line(version: &str, built_at: Option<&str>) -> Option<String> {
    match built_at {
        Some(date) if !version.is_empty() && !date.is_empty() => {
            Some(format!("version: {version} (built at {date})"))
        }
        _ => None,
    }
}

fn render_index(ws_path: &str) -> String {
    INDEX_TEMPLATE.replace("{{WS_PATH}}", ws_path)
}

/// A bound listener plus the router it will serve.
///
/// Binding and serving are separate steps so callers (and tests) can learn
/// the actual port before any request is handled.
pub struct HubServer {
    listener: TcpListener,
    router: Router,
}

impl HubServer {
    /// Binds `config.bind_addr`, starts the hub dispatcher, and builds the
    /// router.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(config: &ServerConfig, limits: ConnectionLimits) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr))?;
        let hub = Hub::spawn();
        let router = router(config, hub, limits);
        info!(
            "listening on {} (websocket path {})",
            listener.local_addr().unwrap_or(config.bind_addr),
            config.ws_path()
        );
        Ok(Self { listener, router })
    }

    /// The address actually bound, useful when binding port 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot report the socket address.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read listener address")
    }

    /// Serves requests until `shutdown` resolves.
    ///
    /// Connections that were already upgraded are not waited for.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while accepting connections.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")
    }
}

/// Binds with default connection limits and serves until `shutdown`
/// resolves.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn run_server<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    HubServer::bind(&config, ConnectionLimits::default())
        .await?
        .run(shutdown)
        .await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
