//! The hub: single owner of the membership set and the fan-out engine.
//!
//! # Concurrency model
//!
//! Exactly one task, the dispatcher started by [`Hub::run`], ever touches the
//! set of registered connections.  Everything else talks to it through a
//! cloneable [`HubHandle`], which submits one of three intents over three
//! intake channels:
//!
//! ```text
//!  acceptor ── register ───┐
//!  reader   ── unregister ─┼──► dispatcher ──► members: HashMap<ConnectionId, Connection>
//!  reader   ── broadcast ──┘          │
//!                                     └──► try_send into each member's outbound queue
//! ```
//!
//! Because the dispatcher applies intents one at a time, register,
//! unregister, and broadcast are linearizable in the order it observes them,
//! without any lock around the map.
//!
//! # Backpressure
//!
//! Fan-out never waits on a recipient.  Each enqueue is a `try_send` whose
//! result is a [`DeliveryOutcome`]; a full (or already closed) queue evicts
//! the recipient in the same pass.  Removing a member drops the only sender
//! of its outbound queue, which is how its writer loop learns to send a close
//! frame and stop.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wshub_core::{ConnectionId, DeliveryOutcome, Message};

use crate::application::connection::Connection;

/// Capacity of each of the three intake channels.
///
/// Readers wait here when the dispatcher falls behind; that is the only
/// place a sender is ever slowed down.
const INTAKE_CAPACITY: usize = 64;

/// Errors returned by [`HubHandle`] methods.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    /// The dispatcher task is no longer running (process shutdown).
    #[error("hub dispatcher has shut down")]
    Closed,
}

/// Cloneable sending side of the hub's three intake channels.
#[derive(Debug, Clone)]
pub struct HubHandle {
    register: mpsc::Sender<Connection>,
    unregister: mpsc::Sender<ConnectionId>,
    broadcast: mpsc::Sender<Message>,
}

impl HubHandle {
    /// Asks the hub to add `conn` to the membership set.
    ///
    /// Takes the connection by value: a connection can be registered once,
    /// and after it has been removed nothing can put it back.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Closed`] if the dispatcher has stopped.
    pub async fn register(&self, conn: Connection) -> Result<(), HubError> {
        self.register.send(conn).await.map_err(|_| HubError::Closed)
    }

    /// Asks the hub to remove `id` and close its outbound queue.
    ///
    /// Safe to call any number of times, including for IDs that were already
    /// evicted or never registered.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Closed`] if the dispatcher has stopped.
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.unregister.send(id).await.map_err(|_| HubError::Closed)
    }

    /// Submits `msg` for delivery to every registered connection.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Closed`] if the dispatcher has stopped.
    pub async fn broadcast(&self, msg: Message) -> Result<(), HubError> {
        self.broadcast.send(msg).await.map_err(|_| HubError::Closed)
    }
}

/// Result of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Members that received the message.
    pub delivered: usize,
    /// Members removed because their queue was full or closed.
    pub evicted: usize,
}

/// The dispatcher state: membership set plus the receiving ends of the intake
/// channels.
pub struct Hub {
    members: HashMap<ConnectionId, Connection>,
    register_rx: mpsc::Receiver<Connection>,
    unregister_rx: mpsc::Receiver<ConnectionId>,
    broadcast_rx: mpsc::Receiver<Message>,
}

impl Hub {
    /// Creates a hub and the handle used to reach it.
    ///
    /// Nothing is processed until [`Hub::run`] is polled.
    pub fn new() -> (Self, HubHandle) {
        let (register, register_rx) = mpsc::channel(INTAKE_CAPACITY);
        let (unregister, unregister_rx) = mpsc::channel(INTAKE_CAPACITY);
        let (broadcast, broadcast_rx) = mpsc::channel(INTAKE_CAPACITY);
        let hub = Self {
            members: HashMap::new(),
            register_rx,
            unregister_rx,
            broadcast_rx,
        };
        let handle = HubHandle {
            register,
            unregister,
            broadcast,
        };
        (hub, handle)
    }

    /// Creates a hub, spawns its dispatcher on the current runtime, and
    /// returns the handle.
    pub fn spawn() -> HubHandle {
        let (hub, handle) = Self::new();
        tokio::spawn(hub.run());
        handle
    }

    /// Runs the dispatcher until every [`HubHandle`] has been dropped.
    ///
    /// The `biased` select drains pending registrations first, then
    /// removals, then broadcasts.  A caller that registers (or unregisters)
    /// and then broadcasts therefore always sees its own intents applied in
    /// that order.
    pub async fn run(mut self) {
        info!("hub dispatcher started");
        loop {
            tokio::select! {
                biased;
                Some(conn) = self.register_rx.recv() => self.apply_register(conn),
                Some(id) = self.unregister_rx.recv() => {
                    self.apply_unregister(id);
                }
                Some(msg) = self.broadcast_rx.recv() => {
                    self.apply_broadcast(&msg);
                }
                else => break,
            }
        }
        info!(
            "hub dispatcher stopped with {} member(s) still registered",
            self.members.len()
        );
    }

    #[cfg(test)]
    fn member_count(&self) -> usize {
        self.members.len()
    }

    fn apply_register(&mut self, conn: Connection) {
        let id = conn.id();
        self.members.insert(id, conn);
        debug!("connection {id}: joined ({} member(s))", self.members.len());
    }

    /// Removes `id`; dropping the entry closes its outbound queue.
    ///
    /// Returns `false` if `id` was not a member.
    fn apply_unregister(&mut self, id: ConnectionId) -> bool {
        match self.members.remove(&id) {
            Some(_) => {
                debug!("connection {id}: left ({} member(s))", self.members.len());
                true
            }
            None => false,
        }
    }

    fn apply_broadcast(&mut self, msg: &Message) -> FanOut {
        let mut fan_out = FanOut::default();
        self.members.retain(|id, conn| {
            let outcome = conn.offer(msg.clone());
            match outcome {
                DeliveryOutcome::Delivered => fan_out.delivered += 1,
                DeliveryOutcome::Evict(reason) => {
                    warn!("connection {id}: evicted ({reason})");
                    fan_out.evicted += 1;
                }
            }
            outcome.keeps_member()
        });
        debug!(
            "broadcast {} bytes: delivered={} evicted={}",
            msg.len(),
            fan_out.delivered,
            fan_out.evicted
        );
        fan_out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
