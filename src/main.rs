use std::future;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::*;
use signal_probe::tungstenite::protocol::frame::coding::CloseCode;
use signal_probe::tungstenite::protocol::CloseFrame;
use signal_probe::{
    connect_with_options, BearerToken, ConnectOptions, Payload, SignalEndpoint, SignalEvent,
    TokenDelivery,
};
use tokio::time::{self, Interval};

/// Probe a signaling WebSocket endpoint with a pre-issued bearer token.
///
/// Connects, prints one line per lifecycle event and exits when the
/// connection ends.
#[derive(Debug, Parser)]
#[command(name = "signal-probe", version)]
struct Args {
    /// Endpoint URL (ws:// or wss://).
    url: String,

    /// Bearer token presented during the handshake.
    #[arg(long, env = "SIGNAL_TOKEN", hide_env_values = true)]
    token: String,

    /// Send the token as an access_token query parameter instead of the
    /// authorization header.
    #[arg(long)]
    query_token: bool,

    /// Give up on the handshake after this many seconds.
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u64>,

    /// Text to send once the connection opens.
    #[arg(long, value_name = "TEXT")]
    send: Option<String>,

    /// With --send, keep sending every SECS seconds with a running counter
    /// appended.
    #[arg(long, value_name = "SECS", requires = "send",
          value_parser = clap::value_parser!(u64).range(1..))]
    send_every: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let delivery = if args.query_token { TokenDelivery::Query } else { TokenDelivery::Header };
    let token = BearerToken::new(args.token)?;
    let endpoint = SignalEndpoint::new(&args.url, token)?.with_delivery(delivery);

    let options = ConnectOptions {
        connect_timeout: args.connect_timeout.map(Duration::from_secs),
        ..ConnectOptions::default()
    };

    debug!("dialing {}", endpoint);
    let (mut connection, mut events) = connect_with_options(&endpoint, options)
        .await
        .with_context(|| format!("could not connect to {}", endpoint))?;

    let mut ticker: Option<Interval> = None;
    let mut counter: u32 = 0;
    let mut closing = false;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Some(event) => {
                    report(&event);
                    if let SignalEvent::Opened = event {
                        if let Some(secs) = args.send_every {
                            ticker = Some(time::interval(Duration::from_secs(secs)));
                        } else if let Some(text) = &args.send {
                            if let Err(e) = connection.send_text(text.clone()).await {
                                warn!("send failed: {}", e);
                            }
                        }
                    }
                }
                None => break,
            },
            _ = next_tick(&mut ticker) => {
                if let Some(base) = &args.send {
                    let text = format!("{} {:04}", base, counter);
                    counter += 1;
                    if let Err(e) = connection.send_text(text).await {
                        warn!("send failed: {}", e);
                        ticker = None;
                    }
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if closing {
                    warn!("interrupted again, leaving without the close handshake");
                    break;
                }
                closing = true;
                ticker = None;
                info!("interrupt, starting the close handshake");
                let frame = CloseFrame { code: CloseCode::Normal, reason: "probe done".into() };
                if let Err(e) = connection.close(Some(frame)).await {
                    warn!("close failed: {}", e);
                    break;
                }
            },
        }
    }

    Ok(())
}

/// One stdout line per event; the close code goes to the diagnostic log.
fn report(event: &SignalEvent) {
    match event {
        SignalEvent::Opened => println!("Connected to the server"),
        SignalEvent::MessageReceived { payload: Payload::Text(text) } => {
            println!("Received: {}", text);
        }
        SignalEvent::MessageReceived { payload: Payload::Binary(data) } => {
            println!("Received: {} binary bytes", data.len());
        }
        SignalEvent::Closed { frame } => {
            if let Some(frame) = frame {
                info!(
                    "closed with code={} reason={:?}",
                    u16::from(frame.code),
                    frame.reason.as_str()
                );
            }
            println!("Disconnected from the server");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}
