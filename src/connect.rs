//! Connection helper.

use std::fmt;
use std::time::Duration;

use log::*;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;
use url::Url;

use crate::auth::{authorize, BearerToken, TokenDelivery};
use crate::error::Error;
use crate::event::SignalEvent;
use crate::session::{self, SignalConnection};

/// A signaling endpoint: where to connect and how to authenticate there.
#[derive(Clone)]
pub struct SignalEndpoint {
    url: Url,
    token: BearerToken,
    delivery: TokenDelivery,
}

impl SignalEndpoint {
    /// Parses the URL and pairs it with the credential.
    ///
    /// Only `ws` and `wss` schemes are accepted; anything else is refused
    /// before a single packet leaves.
    pub fn new(url: &str, token: BearerToken) -> Result<Self, Error> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(Error::UnsupportedScheme(other.to_string())),
        }
        Ok(SignalEndpoint { url, token, delivery: TokenDelivery::default() })
    }

    /// Selects how the credential rides the handshake. The default is the
    /// `authorization` header.
    pub fn with_delivery(mut self, delivery: TokenDelivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// The endpoint URL as given.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL with every query value masked, safe for logs.
    fn redacted(&self) -> Url {
        let mut shown = self.url.clone();
        if shown.query().map_or(false, |q| !q.is_empty()) {
            let keys: Vec<String> = shown.query_pairs().map(|(k, _)| k.into_owned()).collect();
            shown
                .query_pairs_mut()
                .clear()
                .extend_pairs(keys.iter().map(|k| (k.as_str(), "redacted")));
        }
        shown
    }
}

impl fmt::Display for SignalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.redacted(), f)
    }
}

impl fmt::Debug for SignalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.redacted();
        f.debug_struct("SignalEndpoint")
            .field("url", &url.as_str())
            .field("token", &self.token)
            .field("delivery", &self.delivery)
            .finish()
    }
}

/// Tuning knobs for [`connect_with_options`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    /// Give up on the handshake when it does not finish within this time.
    /// `None` waits as long as the operating system does.
    pub connect_timeout: Option<Duration>,
    /// Capacity of the event channel. A full channel pauses the socket
    /// read until the consumer catches up, keeping arrival order intact.
    pub event_buffer: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions { connect_timeout: None, event_buffer: 32 }
    }
}

/// Connects to the endpoint and starts the event pump.
///
/// On success the caller gets a [`SignalConnection`] for sending and a
/// receiver yielding [`SignalEvent`]s in arrival order: one
/// [`SignalEvent::Opened`], the inbound messages, one
/// [`SignalEvent::Closed`], then the channel closes. On failure no event is
/// ever emitted; in particular a rejected credential surfaces as
/// [`Error::Rejected`] and the connection never reaches the open state.
pub async fn connect(
    endpoint: &SignalEndpoint,
) -> Result<(SignalConnection, mpsc::Receiver<SignalEvent>), Error> {
    connect_with_options(endpoint, ConnectOptions::default()).await
}

/// The same as `connect()` but the one can specify connect options.
/// Please refer to `connect()` for more details.
pub async fn connect_with_options(
    endpoint: &SignalEndpoint,
    options: ConnectOptions,
) -> Result<(SignalConnection, mpsc::Receiver<SignalEvent>), Error> {
    let request = authorize(&endpoint.url, &endpoint.token, endpoint.delivery)?;

    debug!("connecting to {}", endpoint);
    let handshake = connect_async(request);
    let result = match options.connect_timeout {
        Some(limit) => timeout(limit, handshake).await.map_err(|_| Error::Timeout(limit))?,
        None => handshake.await,
    };
    let (stream, response) = match result {
        Ok(established) => established,
        Err(tungstenite::Error::Http(response)) => {
            return Err(Error::Rejected { status: response.status() });
        }
        Err(e) => return Err(Error::Ws(e)),
    };
    debug!("handshake accepted with status {}", response.status());

    Ok(session::start(stream, options.event_buffer))
}
