//! Per-connection lifecycle: the outbound queue, the reader and writer loops,
//! and the runner that ties them to the hub.
//!
//! # Lifecycle
//!
//! ```text
//! open ──► register ──► ┌ reader loop (this task)     ┐ ──► unregister ──► closed
//!                       └ writer loop (spawned task)  ┘
//! ```
//!
//! The two loops share no state except the outbound queue, and only the hub
//! holds its sending end.  Shutdown is therefore driven from one place:
//!
//! - The reader exits (peer closed, protocol violation, read timeout) →
//!   the runner unregisters → the hub drops the queue sender → the writer
//!   sees the queue close, sends a close frame, and exits.
//! - The writer exits (write error or timeout) → the runner stops polling
//!   the reader, which releases the read half, and unregisters just as if the
//!   read had failed.
//! - The hub evicts a slow consumer → the queue closes → the writer exits as
//!   above, and the runner's unregister becomes a harmless no-op.
//!
//! The loops are generic over a `Stream`/`Sink` of [`Frame`]s so they can be
//! driven by an axum WebSocket in production and by in-memory channels in
//! tests.

pub mod reader;
pub mod writer;

use std::fmt;
use std::time::Duration;

use futures_util::{Sink, Stream};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use wshub_core::{ConnectionId, DeliveryOutcome, EvictReason, Frame, Message, MessageError};

use crate::application::hub::{HubError, HubHandle};
use crate::domain::ConnectionLimits;

pub use reader::{read_loop, ReadEnd};
pub use writer::write_loop;

/// Receiving end of a connection's outbound queue, owned by its writer loop.
pub type OutboundQueue = mpsc::Receiver<Message>;

/// Why a connection loop stopped abnormally.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer sent something the hub refuses to relay.
    #[error("protocol violation: {0}")]
    Protocol(#[from] MessageError),

    /// Reading from or writing to the socket failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// No frame arrived within the read deadline.
    #[error("no frame received within {0:?}")]
    ReadTimeout(Duration),

    /// A frame write did not complete within the write deadline.
    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    /// The hub stopped while the connection was still running.
    #[error(transparent)]
    Hub(#[from] HubError),
}

/// The hub's view of one connection: its identity and the sending end of its
/// outbound queue.
///
/// Deliberately not `Clone`.  The hub holds the only sender, so removing the
/// connection from the hub is what closes the queue.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    outbound: mpsc::Sender<Message>,
}

impl Connection {
    /// Creates a connection with a fresh ID and an outbound queue of
    /// `capacity` messages.
    ///
    /// Returns the connection (to hand to the hub) and the queue's receiving
    /// end (to hand to the writer loop).
    pub fn open(capacity: usize) -> (Self, OutboundQueue) {
        let (outbound, queue) = mpsc::channel(capacity);
        let conn = Self {
            id: ConnectionId::new(),
            outbound,
        };
        (conn, queue)
    }

    /// This connection's identity.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Non-blocking enqueue used by the hub's fan-out.
    pub(crate) fn offer(&self, msg: Message) -> DeliveryOutcome {
        match self.outbound.try_send(msg) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(TrySendError::Full(_)) => DeliveryOutcome::Evict(EvictReason::QueueFull),
            Err(TrySendError::Closed(_)) => DeliveryOutcome::Evict(EvictReason::QueueClosed),
        }
    }
}

/// Runs one accepted connection from registration to close.
///
/// Registers a new [`Connection`] with the hub, spawns the writer loop,
/// runs the reader loop on the current task, and unregisters once either
/// loop has ended.  Returns after both loops have stopped.
pub async fn run_connection<St, StErr, Si>(
    stream: St,
    sink: Si,
    hub: HubHandle,
    limits: ConnectionLimits,
) where
    St: Stream<Item = Result<Frame, StErr>> + Unpin,
    StErr: fmt::Display,
    Si: Sink<Frame> + Unpin + Send + 'static,
    Si::Error: fmt::Display + Send,
{
    let (conn, queue) = Connection::open(limits.queue_capacity);
    let id = conn.id();
    if let Err(e) = hub.register(conn).await {
        warn!("connection {id}: not registered: {e}");
        return;
    }
    info!("connection {id}: registered");

    let mut writer = tokio::spawn(write_loop(id, sink, queue, limits.clone()));

    let writer_finished = tokio::select! {
        read = read_loop(id, stream, &hub, &limits) => {
            log_read_end(id, &read);
            false
        }
        written = &mut writer => {
            log_write_end(id, written);
            true
        }
    };

    // Either way the read half is released by now.  Unregistering closes the
    // queue, which stops the writer if it is still running.
    if let Err(e) = hub.unregister(id).await {
        debug!("connection {id}: unregister skipped: {e}");
    }

    if !writer_finished {
        log_write_end(id, writer.await);
    }
    info!("connection {id}: closed");
}

fn log_read_end(id: ConnectionId, result: &Result<ReadEnd, ConnectionError>) {
    match result {
        Ok(ReadEnd::PeerClosed(Some(code))) if !code.is_expected() => {
            warn!("connection {id}: peer closed with unexpected code {}", code.0);
        }
        Ok(end) => debug!("connection {id}: reader finished: {end:?}"),
        Err(e @ ConnectionError::Protocol(_)) => warn!("connection {id}: {e}"),
        Err(e) => debug!("connection {id}: reader stopped: {e}"),
    }
}

fn log_write_end(id: ConnectionId, result: Result<Result<(), ConnectionError>, JoinError>) {
    match result {
        Ok(Ok(())) => debug!("connection {id}: writer finished"),
        Ok(Err(e)) => debug!("connection {id}: writer stopped: {e}"),
        Err(e) => warn!("connection {id}: writer task failed: {e}"),
    }
}

// ── Test transport ────────────────────────────────────────────────────────────


// ── Tests ─────────────────────────────────────────────────────────────────────
