//! The send handle and the event pump.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::*;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Bytes, Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::Error;
use crate::event::{Payload, SignalEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The sending half of an established connection.
///
/// Inbound traffic arrives on the event receiver returned alongside this
/// handle; the handle itself only writes. After [`close`](Self::close) the
/// transport refuses further sends, which the next send surfaces as an
/// error.
#[derive(Debug)]
pub struct SignalConnection {
    sink: SplitSink<WsStream, Message>,
}

impl SignalConnection {
    /// Sends a text frame.
    pub async fn send_text(&mut self, text: impl Into<Utf8Bytes>) -> Result<(), Error> {
        self.send(Message::Text(text.into())).await
    }

    /// Sends a binary frame.
    pub async fn send_binary(&mut self, data: impl Into<Bytes>) -> Result<(), Error> {
        self.send(Message::Binary(data.into())).await
    }

    /// Sends a raw protocol message.
    pub async fn send(&mut self, message: Message) -> Result<(), Error> {
        self.sink.send(message).await?;
        Ok(())
    }

    /// Close the underlying web socket.
    pub async fn close(&mut self, frame: Option<CloseFrame>) -> Result<(), Error> {
        self.send(Message::Close(frame)).await
    }
}

/// Splits the stream and starts the pump that turns inbound frames into
/// events.
pub(crate) fn start(
    stream: WsStream,
    buffer: usize,
) -> (SignalConnection, mpsc::Receiver<SignalEvent>) {
    let (sink, source) = stream.split();
    // zero capacity would panic in mpsc::channel
    let (events, receiver) = mpsc::channel(buffer.max(1));
    tokio::spawn(pump(source, events));
    (SignalConnection { sink }, receiver)
}

/// Reads the connection to its end, forwarding one event per observation.
///
/// A full channel pauses the read here, so arrival order survives a slow
/// consumer. A dropped receiver stops the pump even while the connection
/// is idle.
async fn pump(mut source: SplitStream<WsStream>, events: mpsc::Sender<SignalEvent>) {
    if events.send(SignalEvent::Opened).await.is_err() {
        return;
    }

    let mut close_frame = None;
    loop {
        let next = tokio::select! {
            next = source.next() => match next {
                Some(next) => next,
                None => break,
            },
            // a parked read would not notice the receiver going away
            _ = events.closed() => {
                debug!("event receiver dropped, stopping the pump");
                return;
            }
        };
        let message = match next {
            Ok(message) => message,
            Err(e) => {
                warn!("read failed: {}", e);
                break;
            }
        };
        let event = match message {
            Message::Text(text) => SignalEvent::MessageReceived { payload: Payload::Text(text) },
            Message::Binary(data) => {
                SignalEvent::MessageReceived { payload: Payload::Binary(data) }
            }
            Message::Close(frame) => {
                // keep polling so the close handshake finishes
                close_frame = frame;
                continue;
            }
            Message::Ping(data) => {
                trace!("ping ({} bytes), transport answers it", data.len());
                continue;
            }
            Message::Pong(data) => {
                trace!("pong ({} bytes)", data.len());
                continue;
            }
            Message::Frame(_) => continue,
        };
        if events.send(event).await.is_err() {
            debug!("event receiver dropped, stopping the pump");
            return;
        }
    }

    let _ = events.send(SignalEvent::Closed { frame: close_frame }).await;
}
