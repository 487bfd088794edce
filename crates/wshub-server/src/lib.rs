//! wshub-server library crate.
//!
//! A single-room broadcast hub over WebSocket: every text message a client
//! sends is normalized and relayed to every connected client, the sender
//! included.
//!
//! # Architecture
//!
//! ```text
//! Browser / ws client
//!         ↕  (WebSocket text frames)
//! [wshub-server]
//!   ├── domain/           ServerConfig, ConnectionLimits
//!   ├── application/
//!   │     ├── hub         dispatcher task owning the membership set
//!   │     └── connection  reader loop, writer loop, run_connection
//!   └── infrastructure/
//!         ├── ws_adapter  axum WebSocket ↔ wshub_core::Frame
//!         └── http_server router (/, /health, /version, {prefix}ws)
//! ```
//!
//! # Layer rules
//!
//! - `domain` does no I/O.
//! - `application` sees only `Stream`/`Sink` of frames, never a socket.
//! - `infrastructure` is the only layer that knows about axum.

/// Domain layer: configuration and limits.
pub mod domain;

/// Application layer: hub and connection loops.
pub mod application;

/// Infrastructure layer: HTTP server and WebSocket adapter.
pub mod infrastructure;
