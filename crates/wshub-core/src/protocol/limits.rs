//! Protocol limits shared by the hub and the connection loops.
//!
//! These are the defaults; the server wraps them in a `ConnectionLimits`
//! value so tests can shrink them.

use std::time::Duration;

/// Largest inbound message, in bytes, a client may send.
pub const MAX_MESSAGE_SIZE: usize = 512;

/// A connection that sends nothing (not even a pong) for this long is closed.
pub const READ_DEADLINE: Duration = Duration::from_secs(60);

/// Upper bound on a single frame write.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Keepalive ping period: 9/10 of [`WRITE_DEADLINE`].
///
/// Must stay below [`READ_DEADLINE`] so a healthy peer's pong always arrives
/// before the read side gives up.
pub const PING_PERIOD: Duration = Duration::from_millis(WRITE_DEADLINE.as_millis() as u64 * 9 / 10);

/// Capacity of each connection's outbound queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Separator placed between coalesced messages in one outbound frame.
pub const BATCH_SEPARATOR: char = '\n';
