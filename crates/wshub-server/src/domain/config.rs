//! Server configuration types.
//!
//! [`ServerConfig`] holds what an operator can change (listen address and URL
//! prefix).  [`ConnectionLimits`] holds the per-connection protocol limits;
//! those are fixed in production and only shrunk by tests.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use wshub_core::protocol::limits::{
    MAX_MESSAGE_SIZE, OUTBOUND_QUEUE_CAPACITY, PING_PERIOD, READ_DEADLINE, WRITE_DEADLINE,
};

/// Errors produced while validating configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The URL prefix contains characters that cannot appear in a route path.
    #[error("invalid URL prefix '{0}': must not contain whitespace or any of ?#:*")]
    InvalidPrefix(String),
}

/// Where the server listens and how its routes are mounted.
///
/// # Example
///
/// ```rust
/// use wshub_server::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8080);
/// assert_eq!(cfg.ws_path(), "/ws");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port the HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// URL prefix of the upgrade endpoint, always starting and ending with `/`.
    prefix: String,
}

impl ServerConfig {
    /// Builds a config, normalizing `prefix` so it starts and ends with `/`.
    ///
    /// `""`, `"/"`, `"chat"`, and `"/chat/"` become `"/"`, `"/"`, `"/chat/"`,
    /// and `"/chat/"` respectively.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] if the prefix contains
    /// whitespace or one of `?`, `#`, `:`, `*`.  The last two would be read
    /// as route parameters.
    pub fn new(bind_addr: SocketAddr, prefix: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr,
            prefix: normalize_prefix(prefix)?,
        })
    }

    /// The normalized URL prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path of the WebSocket upgrade endpoint: `{prefix}ws`.
    pub fn ws_path(&self) -> String {
        format!("{}ws", self.prefix)
    }
}

impl Default for ServerConfig {
    /// `0.0.0.0:8080` with the upgrade endpoint at `/ws`.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            prefix: "/".to_string(),
        }
    }
}

fn normalize_prefix(raw: &str) -> Result<String, ConfigError> {
    if raw.chars().any(|c| c.is_whitespace() || matches!(c, '?' | '#' | ':' | '*')) {
        return Err(ConfigError::InvalidPrefix(raw.to_string()));
    }
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{trimmed}/"))
    }
}

/// Limits enforced on every connection by its reader and writer loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Largest inbound message in bytes.
    pub max_message_size: usize,
    /// Inactivity window after which the reader gives up.
    pub read_deadline: Duration,
    /// Upper bound on one frame write.
    pub write_deadline: Duration,
    /// Keepalive ping period; kept below `read_deadline`.
    pub ping_period: Duration,
    /// Capacity of the outbound queue.
    pub queue_capacity: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            read_deadline: READ_DEADLINE,
            write_deadline: WRITE_DEADLINE,
            ping_period: PING_PERIOD,
            queue_capacity: OUTBOUND_QUEUE_CAPACITY,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn test_default_port_is_8080() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr.port(), 8080);
    }

    #[test]
    fn test_default_binds_all_interfaces() {
        let cfg = ServerConfig::default();
        assert!(cfg.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn test_default_ws_path_is_root_ws() {
        assert_eq!(ServerConfig::default().ws_path(), "/ws");
    }

    #[test]
    fn test_root_prefix_variants_normalize_to_slash() {
        for raw in ["", "/", "//"] {
            let cfg = ServerConfig::new(addr(), raw).unwrap();
            assert_eq!(cfg.prefix(), "/", "prefix {raw:?}");
        }
    }

    #[test]
    fn test_prefix_gains_leading_and_trailing_slash() {
        // Arrange / Act
        let cfg = ServerConfig::new(addr(), "chat").unwrap();

        // Assert
        assert_eq!(cfg.prefix(), "/chat/");
        assert_eq!(cfg.ws_path(), "/chat/ws");
    }

    #[test]
    fn test_nested_prefix_is_kept() {
        let cfg = ServerConfig::new(addr(), "/apps/chat/").unwrap();
        assert_eq!(cfg.ws_path(), "/apps/chat/ws");
    }

    #[test]
    fn test_prefix_with_query_marker_is_rejected() {
        let result = ServerConfig::new(addr(), "/chat?x=1");
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidPrefix("/chat?x=1".to_string())
        );
    }

    #[test]
    fn test_prefix_with_route_parameter_is_rejected() {
        assert!(ServerConfig::new(addr(), "/:room/").is_err());
        assert!(ServerConfig::new(addr(), "/a*b").is_err());
    }

    #[test]
    fn test_prefix_with_space_is_rejected() {
        assert!(ServerConfig::new(addr(), "/my chat").is_err());
    }

    #[test]
    fn test_default_limits_match_protocol_constants() {
        let limits = ConnectionLimits::default();
        assert_eq!(limits.max_message_size, 512);
        assert_eq!(limits.read_deadline, Duration::from_secs(60));
        assert_eq!(limits.write_deadline, Duration::from_secs(10));
        assert_eq!(limits.ping_period, Duration::from_secs(9));
        assert_eq!(limits.queue_capacity, 256);
    }
}
