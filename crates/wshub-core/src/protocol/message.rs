//! The broadcast message model.
//!
//! A [`Message`] is what the hub fans out: an immutable, already-normalized,
//! single-line UTF-8 payload.  It is cheap to clone (reference counted), so
//! one inbound message can be placed on hundreds of outbound queues without
//! copying the text.
//!
//! # Why normalize to a single line?
//!
//! A connection's writer coalesces every message that is already waiting in
//! its queue into one outbound frame, separated by `\n`.  Receivers recover
//! the individual messages by splitting on `\n`.  That only works if no
//! message contains a line break of its own, so line breaks are replaced with
//! spaces before a message ever enters the broadcast path.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::protocol::limits::{BATCH_SEPARATOR, MAX_MESSAGE_SIZE};

/// Reasons an inbound payload cannot become a [`Message`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    /// The payload exceeds the configured size limit.
    #[error("message of {size} bytes exceeds the {limit}-byte limit")]
    TooLarge { size: usize, limit: usize },

    /// The payload is not valid UTF-8 and cannot be relayed as text.
    #[error("message is not valid UTF-8")]
    InvalidUtf8,
}

/// A normalized, single-line broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(Arc<str>);

impl Message {
    /// Builds a message from raw text, normalizing it.
    ///
    /// Every `\n` and `\r` is replaced with a space, then leading and trailing
    /// whitespace is trimmed.  An input that normalizes to nothing produces an
    /// empty message; it is still relayed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wshub_core::Message;
    ///
    /// let msg = Message::normalize("hello\nworld  ");
    /// assert_eq!(msg.as_str(), "hello world");
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let flattened: String = raw
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        Self(Arc::from(flattened.trim()))
    }

    /// Validates and normalizes an inbound payload with the default size limit.
    ///
    /// # Errors
    ///
    /// See [`Message::from_payload_with_limit`].
    pub fn from_payload(payload: &[u8]) -> Result<Self, MessageError> {
        Self::from_payload_with_limit(payload, MAX_MESSAGE_SIZE)
    }

    /// Validates and normalizes an inbound payload.
    ///
    /// The size check applies to the raw payload, before normalization.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::TooLarge`] if `payload` is longer than `limit`
    /// bytes and [`MessageError::InvalidUtf8`] if it is not valid UTF-8.
    pub fn from_payload_with_limit(payload: &[u8], limit: usize) -> Result<Self, MessageError> {
        if payload.len() > limit {
            return Err(MessageError::TooLarge {
                size: payload.len(),
                limit,
            });
        }
        let text = std::str::from_utf8(payload).map_err(|_| MessageError::InvalidUtf8)?;
        Ok(Self::normalize(text))
    }

    /// Returns the message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the message text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the message normalized to an empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins messages into one outbound payload, separated by `\n`, in order.
///
/// # Examples
///
/// ```rust
/// use wshub_core::{coalesce, Message};
///
/// let batch = [Message::normalize("a"), Message::normalize("b")];
/// assert_eq!(coalesce(&batch), "a\nb");
/// ```
pub fn coalesce(messages: &[Message]) -> String {
    let capacity = messages.iter().map(|m| m.len() + 1).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    for (i, msg) in messages.iter().enumerate() {
        if i > 0 {
            out.push(BATCH_SEPARATOR);
        }
        out.push_str(msg.as_str());
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_newline_and_trims_trailing_space() {
        // Arrange / Act
        let msg = Message::normalize("hello\nworld  ");

        // Assert
        assert_eq!(msg.as_str(), "hello world");
    }

    #[test]
    fn test_normalize_replaces_carriage_return() {
        let msg = Message::normalize("a\r\nb");
        assert_eq!(msg.as_str(), "a  b");
    }

    #[test]
    fn test_normalize_trims_leading_whitespace_and_newlines() {
        let msg = Message::normalize("\n\t  hi");
        assert_eq!(msg.as_str(), "hi");
    }

    #[test]
    fn test_normalize_keeps_inner_spacing() {
        let msg = Message::normalize("a   b");
        assert_eq!(msg.as_str(), "a   b");
    }

    #[test]
    fn test_normalize_whitespace_only_yields_empty_message() {
        let msg = Message::normalize(" \n \r ");
        assert!(msg.is_empty());
    }

    #[test]
    fn test_from_payload_accepts_limit_sized_payload() {
        // Arrange: exactly MAX_MESSAGE_SIZE bytes is still allowed
        let payload = vec![b'x'; MAX_MESSAGE_SIZE];

        // Act
        let msg = Message::from_payload(&payload).unwrap();

        // Assert
        assert_eq!(msg.len(), MAX_MESSAGE_SIZE);
    }

    #[test]
    fn test_from_payload_rejects_oversized_payload() {
        let payload = vec![b'x'; MAX_MESSAGE_SIZE + 1];

        let result = Message::from_payload(&payload);

        assert_eq!(
            result,
            Err(MessageError::TooLarge {
                size: MAX_MESSAGE_SIZE + 1,
                limit: MAX_MESSAGE_SIZE
            })
        );
    }

    #[test]
    fn test_from_payload_limit_applies_before_trimming() {
        // Trailing whitespace would be trimmed away, but the raw frame was
        // still too large.
        let mut payload = b"short".to_vec();
        payload.extend(std::iter::repeat(b' ').take(MAX_MESSAGE_SIZE));

        assert!(matches!(
            Message::from_payload(&payload),
            Err(MessageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_from_payload_rejects_invalid_utf8() {
        let result = Message::from_payload(&[0xff, 0xfe, 0xfd]);
        assert_eq!(result, Err(MessageError::InvalidUtf8));
    }

    #[test]
    fn test_from_payload_with_custom_limit() {
        assert!(Message::from_payload_with_limit(b"12345", 4).is_err());
        assert!(Message::from_payload_with_limit(b"1234", 4).is_ok());
    }

    #[test]
    fn test_clone_shares_the_same_text() {
        let msg = Message::normalize("shared");
        let clone = msg.clone();
        assert!(std::ptr::eq(msg.as_str(), clone.as_str()));
    }

    #[test]
    fn test_coalesce_single_message_has_no_separator() {
        let batch = [Message::normalize("only")];
        assert_eq!(coalesce(&batch), "only");
    }

    #[test]
    fn test_coalesce_three_messages_in_order() {
        // Arrange
        let batch = [
            Message::normalize("first"),
            Message::normalize("second\nline"),
            Message::normalize("third "),
        ];

        // Act
        let joined = coalesce(&batch);

        // Assert: the receiving side recovers the originals by splitting
        let parts: Vec<&str> = joined.split('\n').collect();
        assert_eq!(parts, vec!["first", "second line", "third"]);
    }

    #[test]
    fn test_coalesce_empty_slice_is_empty() {
        assert_eq!(coalesce(&[]), "");
    }
}
