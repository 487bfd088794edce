//! Domain layer for wshub-server.
//!
//! Plain configuration values with no I/O: where the server listens, under
//! which path the upgrade endpoint lives, and the per-connection limits the
//! reader and writer loops enforce.
//!
//! Reading environment variables and CLI flags is done in `main.rs`; this
//! layer only validates and holds the result.

pub mod config;

pub use config::{ConfigError, ConnectionLimits, ServerConfig};
