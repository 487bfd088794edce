//! Adapter between axum's WebSocket messages and [`wshub_core::Frame`].
//!
//! The connection loops only see `Stream`/`Sink` of [`Frame`]s.  This module
//! is the one place that knows the concrete socket type.

use std::borrow::Cow;
use std::future::{ready, Ready};

use axum::extract::ws::{CloseFrame, Message as WsMessage, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};

use wshub_core::{CloseCode, Frame};

/// Converts an inbound axum message into a [`Frame`].
pub fn frame_from_ws(msg: WsMessage) -> Frame {
    match msg {
        WsMessage::Text(text) => Frame::Text(text),
        WsMessage::Binary(bytes) => Frame::Binary(bytes),
        WsMessage::Ping(payload) => Frame::Ping(payload),
        WsMessage::Pong(payload) => Frame::Pong(payload),
        WsMessage::Close(close) => Frame::Close(close.map(|c| CloseCode(c.code))),
    }
}

/// Converts an outbound [`Frame`] into an axum message.
///
/// Close frames carry the code only, never a reason.
pub fn frame_to_ws(frame: Frame) -> WsMessage {
    match frame {
        Frame::Text(text) => WsMessage::Text(text),
        Frame::Binary(bytes) => WsMessage::Binary(bytes),
        Frame::Ping(payload) => WsMessage::Ping(payload),
        Frame::Pong(payload) => WsMessage::Pong(payload),
        Frame::Close(None) => WsMessage::Close(None),
        Frame::Close(Some(code)) => WsMessage::Close(Some(CloseFrame {
            code: code.0,
            reason: Cow::Borrowed(""),
        })),
    }
}

fn decode(item: Result<WsMessage, axum::Error>) -> Result<Frame, axum::Error> {
    item.map(frame_from_ws)
}

fn encode(frame: Frame) -> Ready<Result<WsMessage, axum::Error>> {
    ready(Ok(frame_to_ws(frame)))
}

/// Splits an upgraded socket into a frame stream (read half) and a frame
/// sink (write half) that can live on different tasks.
pub fn split_socket(
    socket: WebSocket,
) -> (
    impl Stream<Item = Result<Frame, axum::Error>> + Unpin + Send,
    impl Sink<Frame, Error = axum::Error> + Unpin + Send + 'static,
) {
    let (sink, stream) = socket.split();
    (stream.map(decode), sink.with(encode))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passes_through_both_ways() {
        let frame = frame_from_ws(WsMessage::Text("hi".into()));
        assert_eq!(frame, Frame::Text("hi".into()));
        assert!(matches!(frame_to_ws(frame), WsMessage::Text(t) if t == "hi"));
    }

    #[test]
    fn test_binary_is_kept_as_binary() {
        let frame = frame_from_ws(WsMessage::Binary(vec![1, 2, 3]));
        assert_eq!(frame, Frame::Binary(vec![1, 2, 3]));
    }

    #[test]
    fn test_inbound_close_keeps_code() {
        // Arrange
        let msg = WsMessage::Close(Some(CloseFrame {
            code: 1001,
            reason: Cow::Borrowed("tab closed"),
        }));

        // Act
        let frame = frame_from_ws(msg);

        // Assert
        assert_eq!(frame, Frame::Close(Some(CloseCode::GOING_AWAY)));
    }

    #[test]
    fn test_inbound_close_without_payload() {
        assert_eq!(frame_from_ws(WsMessage::Close(None)), Frame::Close(None));
    }

    #[test]
    fn test_outbound_empty_close_has_no_payload() {
        assert!(matches!(frame_to_ws(Frame::close()), WsMessage::Close(None)));
    }

    #[test]
    fn test_outbound_close_code_has_empty_reason() {
        let msg = frame_to_ws(Frame::Close(Some(CloseCode::NORMAL)));

        let WsMessage::Close(Some(close)) = msg else {
            panic!("expected a close frame with payload");
        };
        assert_eq!(close.code, 1000);
        assert!(close.reason.is_empty());
    }

    #[test]
    fn test_ping_maps_to_ping() {
        assert!(matches!(frame_to_ws(Frame::ping()), WsMessage::Ping(p) if p.is_empty()));
        assert_eq!(frame_from_ws(WsMessage::Pong(vec![7])), Frame::Pong(vec![7]));
    }
}
