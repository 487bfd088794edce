//! Protocol module containing the message model, frame type, and limits.

pub mod frame;
pub mod limits;
pub mod message;

pub use frame::{CloseCode, Frame};
pub use message::{coalesce, Message, MessageError};
