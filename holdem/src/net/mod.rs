//! Client-facing wire protocol.

pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
