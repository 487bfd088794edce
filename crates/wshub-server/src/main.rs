//! wshub: single-room WebSocket broadcast hub, entry point.
//!
//! Every text message a client sends on the upgrade endpoint is normalized
//! (newlines become spaces, surrounding whitespace is trimmed) and relayed to
//! every connected client, the sender included.
//!
//! # Usage
//!
//! ```text
//! wshub [OPTIONS]
//!
//! Options:
//!   --port   <PORT>    Listening port [default: 8080]
//!   --prefix <PREFIX>  URL prefix of the upgrade endpoint [default: /]
//!   --bind   <IP>      Bind address [default: 0.0.0.0]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable    | Default   | Description                      |
//! |-------------|-----------|----------------------------------|
//! | `WS_PORT`   | `8080`    | Listening port                   |
//! | `WS_PREFIX` | `/`       | URL prefix; upgrade is `{prefix}ws` |
//! | `WS_BIND`   | `0.0.0.0` | Bind address                     |
//! | `RUST_LOG`  | `info`    | Log filter                       |

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wshub_server::domain::ServerConfig;
use wshub_server::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Single-room WebSocket broadcast hub.
#[derive(Debug, Parser)]
#[command(
    name = "wshub",
    about = "Relays every WebSocket message to every connected client",
    version
)]
struct Cli {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 8080, env = "WS_PORT")]
    port: u16,

    /// URL prefix of the WebSocket endpoint.
    ///
    /// Leading and trailing slashes are added if missing, so `chat` serves
    /// the upgrade at `/chat/ws`.
    #[arg(long, default_value = "/", env = "WS_PREFIX")]
    prefix: String,

    /// IP address to bind to.
    ///
    /// `0.0.0.0` accepts connections on every interface; `127.0.0.1` only
    /// local ones.
    #[arg(long, default_value = "0.0.0.0", env = "WS_BIND")]
    bind: String,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not an IP address or `--prefix` is
    /// not a usable path prefix.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let ip: IpAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid bind address: '{}'", self.bind))?;

        ServerConfig::new(SocketAddr::new(ip, self.port), &self.prefix).context("invalid --prefix")
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_server_config()?;

    info!(
        "wshub {} starting on {} (websocket path {})",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr,
        config.ws_path()
    );

    run_server(config, shutdown_signal()).await?;

    info!("wshub stopped");
    Ok(())
}

/// Resolves on Ctrl+C.  If the handler cannot be installed the server keeps
/// running until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            error!("failed to listen for Ctrl+C signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_produce_port_8080() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["wshub"]);

        // Assert
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn test_cli_defaults_produce_root_prefix() {
        let cli = Cli::parse_from(["wshub"]);
        assert_eq!(cli.prefix, "/");
    }

    #[test]
    fn test_cli_defaults_bind_all_interfaces() {
        let cli = Cli::parse_from(["wshub"]);
        assert_eq!(cli.bind, "0.0.0.0");
    }

    #[test]
    fn test_cli_port_override() {
        let cli = Cli::parse_from(["wshub", "--port", "9001"]);
        assert_eq!(cli.port, 9001);
    }

    #[test]
    fn test_into_server_config_builds_prefixed_ws_path() {
        // Arrange
        let cli = Cli::parse_from(["wshub", "--prefix", "chat", "--bind", "127.0.0.1"]);

        // Act
        let config = cli.into_server_config().unwrap();

        // Assert
        assert_eq!(config.ws_path(), "/chat/ws");
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_into_server_config_accepts_ipv6_bind() {
        // Arrange
        let cli = Cli::parse_from(["wshub", "--bind", "::", "--port", "9001"]);

        // Act
        let config = cli.into_server_config().unwrap();

        // Assert
        assert_eq!(config.bind_addr, "[::]:9001".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_into_server_config_accepts_ipv6_loopback() {
        let cli = Cli::parse_from(["wshub", "--bind", "::1"]);
        let config = cli.into_server_config().unwrap();
        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_into_server_config_rejects_bad_bind_address() {
        let cli = Cli::parse_from(["wshub", "--bind", "not-an-ip"]);
        assert!(cli.into_server_config().is_err());
    }

    #[test]
    fn test_into_server_config_rejects_bad_prefix() {
        let cli = Cli::parse_from(["wshub", "--prefix", "/chat?x"]);
        assert!(cli.into_server_config().is_err());
    }
}
