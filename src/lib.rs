//! Bearer-authenticated WebSocket probing.
//!
//! This library dials a real-time communication service's signaling
//! endpoint with a pre-issued bearer credential and turns the connection's
//! lifecycle into a channel of tagged events. The three classic callbacks
//! (open / message / close) become one receive loop: the channel yields
//! exactly one [`SignalEvent::Opened`], the inbound messages in arrival
//! order, exactly one [`SignalEvent::Closed`], and then closes.
//!
//! [`connect`] returns the [`SignalConnection`] send handle together with
//! the event receiver; draining the receiver and printing a line per event
//! is all a minimal probe needs to do.

pub use tokio_tungstenite::tungstenite;

mod auth;
mod connect;
mod error;
mod event;
mod session;

pub use auth::{BearerToken, TokenDelivery};
pub use connect::{connect, connect_with_options, ConnectOptions, SignalEndpoint};
pub use error::Error;
pub use event::{Payload, SignalEvent};
pub use session::SignalConnection;
