//! Infrastructure layer for wshub-server.
//!
//! Everything that touches the network lives here: the axum router, the
//! WebSocket upgrade, and the adapter that turns an upgraded socket into the
//! frame stream/sink the connection loops expect.
//!
//! # What does NOT belong here?
//!
//! - Fan-out, eviction, deadlines (that is the application layer)
//! - Configuration parsing (that is done in `main.rs`)

pub mod http_server;
pub mod ws_adapter;

pub use http_server::{router, run_server, HubServer};
