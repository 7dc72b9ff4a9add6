//! Tagged connection events.

use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Bytes, Utf8Bytes};

/// A single observation on the connection, delivered through the event
/// channel in arrival order.
///
/// Per connection the receiver sees exactly one [`Opened`], then zero or
/// more [`MessageReceived`], then exactly one [`Closed`], after which the
/// channel closes. Control frames (ping/pong) are answered by the transport
/// and never show up here.
///
/// [`Opened`]: SignalEvent::Opened
/// [`MessageReceived`]: SignalEvent::MessageReceived
/// [`Closed`]: SignalEvent::Closed
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEvent {
    /// The handshake finished and the connection is up.
    Opened,
    /// An inbound data frame.
    MessageReceived {
        /// The frame contents, carried verbatim.
        payload: Payload,
    },
    /// The connection ended.
    Closed {
        /// The peer's close frame, when the end was an orderly close
        /// handshake that carried one. `None` when the transport dropped
        /// without it.
        frame: Option<CloseFrame>,
    },
}

/// Contents of a data frame. Never parsed here; whatever protocol the
/// server speaks on top is the consumer's business.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(Utf8Bytes),
    Binary(Bytes),
}
