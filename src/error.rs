//! Error types for the connect path.

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Everything that can go wrong between "here is a URL and a token" and an
/// established connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("unsupported URL scheme {0:?}, expected \"ws\" or \"wss\"")]
    UnsupportedScheme(String),

    #[error("bearer token is empty")]
    EmptyToken,

    #[error("bearer token contains characters that cannot be sent in a header")]
    InvalidToken,

    #[error("server rejected the handshake with status {status}")]
    Rejected { status: StatusCode },

    #[error("handshake did not finish within {0:?}")]
    Timeout(Duration),

    #[error("websocket error: {0}")]
    Ws(#[from] tungstenite::Error),
}
