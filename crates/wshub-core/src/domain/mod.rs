//! Domain types for the hub.
//!
//! Like the rest of this crate, nothing here performs I/O.  The server's
//! dispatcher and connection loops use these types to name connections and
//! to describe what happened when a message was offered to one of them.

pub mod connection_id;
pub mod delivery;

pub use connection_id::ConnectionId;
pub use delivery::{DeliveryOutcome, EvictReason};
