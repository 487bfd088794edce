//! Reader loop: inbound frames → normalized messages → hub broadcast intake.

use std::fmt;

use futures_util::{Stream, StreamExt};
use tokio::time::timeout;
use tracing::debug;

use wshub_core::{CloseCode, ConnectionId, Frame, Message};

use super::ConnectionError;
use crate::application::hub::HubHandle;
use crate::domain::ConnectionLimits;

/// How the reader loop ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadEnd {
    /// The peer sent a close frame.
    PeerClosed(Option<CloseCode>),
    /// The stream ended without a close frame.
    StreamEnded,
}

/// Reads frames from `stream` and submits every data frame to the hub.
///
/// - Each read waits at most `limits.read_deadline`; any frame, including a
///   ping or pong, starts a new window.
/// - Pings and pongs are liveness traffic only and are never broadcast.  The
///   WebSocket layer answers pings on its own.
/// - Text and binary payloads larger than `limits.max_message_size`, or that
///   are not UTF-8, end the loop with [`ConnectionError::Protocol`].
///
/// The caller is responsible for unregistering afterwards; see
/// [`run_connection`](super::run_connection).
pub async fn read_loop<St, E>(
    id: ConnectionId,
    mut stream: St,
    hub: &HubHandle,
    limits: &ConnectionLimits,
) -> Result<ReadEnd, ConnectionError>
where
    St: Stream<Item = Result<Frame, E>> + Unpin,
    E: fmt::Display,
{
    loop {
        let next = timeout(limits.read_deadline, stream.next())
            .await
            .map_err(|_| ConnectionError::ReadTimeout(limits.read_deadline))?;

        let payload = match next {
            None => return Ok(ReadEnd::StreamEnded),
            Some(Err(e)) => return Err(ConnectionError::Transport(format!("read: {e}"))),
            Some(Ok(Frame::Text(text))) => text.into_bytes(),
            Some(Ok(Frame::Binary(bytes))) => bytes,
            Some(Ok(Frame::Ping(_))) => continue,
            Some(Ok(Frame::Pong(_))) => {
                debug!("connection {id}: pong");
                continue;
            }
            Some(Ok(Frame::Close(code))) => return Ok(ReadEnd::PeerClosed(code)),
        };

        let msg = Message::from_payload_with_limit(&payload, limits.max_message_size)?;
        debug!("connection {id}: inbound message ({} bytes)", msg.len());
        hub.broadcast(msg).await?;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
