//! Outcome of offering one message to one connection.
//!
//! The hub never waits on a recipient.  Each enqueue attempt either succeeds
//! or tells the hub to evict that recipient; there is no third "retry later"
//! branch.  Modelling this as a plain enum keeps the fan-out loop a simple
//! `match` instead of error handling.

use std::fmt;

/// Why a recipient is being removed during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictReason {
    /// The outbound queue was at capacity: the consumer is too slow.
    QueueFull,
    /// The consuming side of the queue is gone: the writer already exited.
    QueueClosed,
}

impl fmt::Display for EvictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictReason::QueueFull => f.write_str("outbound queue full"),
            EvictReason::QueueClosed => f.write_str("outbound queue closed"),
        }
    }
}

/// Tagged result of a non-blocking enqueue during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The message is on the recipient's queue.
    Delivered,
    /// The recipient must be removed and its queue closed.
    Evict(EvictReason),
}

impl DeliveryOutcome {
    /// Returns `true` if the recipient stays a member after this attempt.
    pub fn keeps_member(self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_keeps_member() {
        assert!(DeliveryOutcome::Delivered.keeps_member());
    }

    #[test]
    fn test_evict_drops_member() {
        assert!(!DeliveryOutcome::Evict(EvictReason::QueueFull).keeps_member());
        assert!(!DeliveryOutcome::Evict(EvictReason::QueueClosed).keeps_member());
    }

    #[test]
    fn test_evict_reason_display() {
        assert_eq!(EvictReason::QueueFull.to_string(), "outbound queue full");
        assert_eq!(EvictReason::QueueClosed.to_string(), "outbound queue closed");
    }
}
