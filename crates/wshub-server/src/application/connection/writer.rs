//! Writer loop: outbound queue → coalesced text frames, plus keepalive pings.

use std::fmt;
use std::time::Duration;

use futures_util::{Sink, SinkExt};
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::debug;

use wshub_core::{coalesce, ConnectionId, Frame, Message};

use super::{ConnectionError, OutboundQueue};
use crate::domain::ConnectionLimits;

/// Drains `queue` to `sink` until the queue is closed or a write fails.
///
/// On every wake-up:
///
/// - **Message available** – take it plus everything already waiting in the
///   queue, join them with `\n`, and write a single text frame.
/// - **Queue closed** – the hub removed this connection.  Send an empty close
///   frame (best effort) and return `Ok(())`.
/// - **Tick** (every `limits.ping_period`) – send an empty ping.
///
/// Every write is bounded by `limits.write_deadline`.  A failed or timed-out
/// write returns an error; the sink is dropped on return.
pub async fn write_loop<Si>(
    id: ConnectionId,
    mut sink: Si,
    mut queue: OutboundQueue,
    limits: ConnectionLimits,
) -> Result<(), ConnectionError>
where
    Si: Sink<Frame> + Unpin,
    Si::Error: fmt::Display,
{
    let mut ticker = interval_at(Instant::now() + limits.ping_period, limits.ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = queue.recv() => match next {
                Some(first) => {
                    let batch = take_pending(first, &mut queue);
                    send_frame(&mut sink, Frame::Text(coalesce(&batch)), limits.write_deadline).await?;
                    debug!("connection {id}: wrote {} message(s)", batch.len());
                }
                None => {
                    if let Err(e) = send_frame(&mut sink, Frame::close(), limits.write_deadline).await {
                        debug!("connection {id}: close frame not sent: {e}");
                    }
                    return Ok(());
                }
            },
            _ = ticker.tick() => {
                send_frame(&mut sink, Frame::ping(), limits.write_deadline).await?;
            }
        }
    }
}

/// Collects `first` plus the messages already queued behind it.
///
/// Only what is pending right now is taken, so a steady inbound stream cannot
/// keep one write growing forever.
fn take_pending(first: Message, queue: &mut OutboundQueue) -> Vec<Message> {
    let pending = queue.len();
    let mut batch = Vec::with_capacity(pending + 1);
    batch.push(first);
    for _ in 0..pending {
        match queue.try_recv() {
            Ok(msg) => batch.push(msg),
            Err(_) => break,
        }
    }
    batch
}

async fn send_frame<Si>(sink: &mut Si, frame: Frame, deadline: Duration) -> Result<(), ConnectionError>
where
    Si: Sink<Frame> + Unpin,
    Si::Error: fmt::Display,
{
    match timeout(deadline, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConnectionError::Transport(format!("write: {e}"))),
        Err(_) => Err(ConnectionError::WriteTimeout(deadline)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
