//! Transport-neutral WebSocket frames.
//!
//! The connection loops in `wshub-server` read and write [`Frame`] values
//! rather than a particular WebSocket library's message type.  The server's
//! infrastructure layer converts between the two, and tests drive the loops
//! with plain in-memory channels of frames.

/// One WebSocket frame as seen by the connection loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A UTF-8 data frame.
    Text(String),
    /// A binary data frame.  Relayed only if it holds valid UTF-8.
    Binary(Vec<u8>),
    /// Liveness probe.
    Ping(Vec<u8>),
    /// Reply to a liveness probe.
    Pong(Vec<u8>),
    /// Close handshake, with the peer's status code if it sent one.
    Close(Option<CloseCode>),
}

impl Frame {
    /// An empty ping, as sent by the writer loop on every keepalive tick.
    pub fn ping() -> Self {
        Frame::Ping(Vec::new())
    }

    /// An empty close frame, as sent when a connection's queue is closed.
    pub fn close() -> Self {
        Frame::Close(None)
    }
}

/// WebSocket close status code (RFC 6455 §7.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseCode(pub u16);

impl CloseCode {
    pub const NORMAL: CloseCode = CloseCode(1000);
    pub const GOING_AWAY: CloseCode = CloseCode(1001);
    pub const NO_STATUS: CloseCode = CloseCode(1005);
    pub const ABNORMAL: CloseCode = CloseCode(1006);

    /// Whether a peer closing with this code is routine.
    ///
    /// Tab closes, navigations, and dropped networks produce these codes all
    /// the time, so they are not worth a warning.
    pub fn is_expected(self) -> bool {
        matches!(
            self,
            Self::NORMAL | Self::GOING_AWAY | Self::NO_STATUS | Self::ABNORMAL
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_and_close_have_empty_payloads() {
        assert_eq!(Frame::ping(), Frame::Ping(Vec::new()));
        assert_eq!(Frame::close(), Frame::Close(None));
    }

    #[test]
    fn test_routine_close_codes_are_expected() {
        for code in [1000, 1001, 1005, 1006] {
            assert!(CloseCode(code).is_expected(), "code {code}");
        }
    }

    #[test]
    fn test_error_close_codes_are_unexpected() {
        // 1002 protocol error, 1009 message too big, 1011 internal error
        for code in [1002, 1009, 1011, 4000] {
            assert!(!CloseCode(code).is_expected(), "code {code}");
        }
    }
}
