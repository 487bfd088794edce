//! # wshub-core
//!
//! Shared library for the wshub broadcast hub containing the message model,
//! the transport-neutral frame type, protocol limits, and the small domain
//! types the hub and its connections exchange.
//!
//! It has zero dependencies on async runtimes, HTTP frameworks, or sockets.
//!
//! # Architecture overview
//!
//! wshub is a single-room relay: every text message a client sends over its
//! WebSocket is normalized to one line and forwarded to every connected
//! client.  This crate defines the vocabulary used by the server crate:
//!
//! - **`protocol`** – What travels over the wire.  [`Message`] is a normalized,
//!   single-line payload; [`Frame`] is the transport-neutral WebSocket frame
//!   the connection loops read and write; [`limits`](protocol::limits) holds
//!   the size, deadline, and queue constants.
//!
//! - **`domain`** – Identity and fan-out outcomes: [`ConnectionId`] names one
//!   accepted connection, [`DeliveryOutcome`] is the tagged result of offering
//!   a message to one connection's outbound queue.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `wshub_core::Message` instead of `wshub_core::protocol::message::Message`.
pub use domain::connection_id::ConnectionId;
pub use domain::delivery::{DeliveryOutcome, EvictReason};
pub use protocol::frame::{CloseCode, Frame};
pub use protocol::message::{coalesce, Message, MessageError};
