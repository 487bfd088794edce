//! Application layer for wshub-server.
//!
//! Owns the relay logic: the hub that keeps the membership set and fans
//! messages out, and the per-connection reader/writer loops that feed it.
//!
//! # Responsibilities
//!
//! - Registering, unregistering, and evicting connections
//! - Fanning each accepted message out to every registered connection
//! - Enforcing message size, read deadline, write deadline, and keepalive
//!   pings on each connection
//!
//! # What does NOT belong here?
//!
//! - HTTP routing and the WebSocket upgrade (that is infrastructure)
//! - Converting axum WebSocket messages to [`wshub_core::Frame`]s
//!   (also infrastructure)

pub mod connection;
pub mod hub;

pub use connection::{run_connection, Connection, ConnectionError, OutboundQueue};
pub use hub::{FanOut, Hub, HubError, HubHandle};
