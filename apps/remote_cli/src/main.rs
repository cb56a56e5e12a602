use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::{SinkExt, StreamExt};
use shared::protocol::{InboundFrame, OutboundFrame};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "automaton-remote", about = "Remote controller for a running Automaton editor")]
struct Args {
    #[arg(long, default_value = "ws://127.0.0.1:9001")]
    url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    Play,
    Pause,
    /// Moves the editor to `time` seconds.
    Seek {
        #[arg(allow_negative_numbers = true)]
        time: f64,
    },
    /// Hands a channel over to the remote controller.
    Auto { name: String },
    /// Prints every frame the editor sends.
    Watch,
    /// Runs a playback clock that drives the editor and follows its transport.
    Drive {
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
}

impl Command {
    fn frame(&self) -> Option<InboundFrame> {
        match self {
            Command::Play => Some(InboundFrame::Play),
            Command::Pause => Some(InboundFrame::Pause),
            Command::Seek { time } => Some(InboundFrame::Update { time: Some(*time) }),
            Command::Auto { name } => Some(InboundFrame::Auto { name: name.clone() }),
            Command::Watch | Command::Drive { .. } => None,
        }
    }
}

/// Playback clock following the editor's play, pause and seek frames.
#[derive(Debug, Default)]
struct Transport {
    origin: f64,
    started: Option<Instant>,
}

impl Transport {
    fn time_at(&self, now: Instant) -> f64 {
        match self.started {
            Some(started) => self.origin + now.duration_since(started).as_secs_f64(),
            None => self.origin,
        }
    }

    fn follow(&mut self, frame: &OutboundFrame, now: Instant) {
        match frame {
            OutboundFrame::Play if self.started.is_none() => self.started = Some(now),
            OutboundFrame::Pause => {
                self.origin = self.time_at(now);
                self.started = None;
            }
            OutboundFrame::Seek { time } => {
                self.origin = *time;
                if self.started.is_some() {
                    self.started = Some(now);
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (socket, _) = connect_async(args.url.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", args.url))?;
    info!(url = %args.url, "connected to editor");
    let (mut writer, mut reader) = socket.split();

    if let Some(frame) = args.command.frame() {
        writer
            .send(Message::Text(serde_json::to_string(&frame)?))
            .await
            .context("failed to send frame")?;
        writer.close().await.context("failed to close connection")?;
        return Ok(());
    }

    let mut transport = Transport::default();
    let mut ticker = match args.command {
        Command::Drive { fps } => Some(tokio::time::interval(Duration::from_nanos(
            1_000_000_000 / u64::from(fps.max(1)),
        ))),
        _ => None,
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            message = reader.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        info!("editor closed the connection");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err).context("connection failed"),
                };
                match serde_json::from_str::<OutboundFrame>(&text) {
                    Ok(frame) => transport.follow(&frame, Instant::now()),
                    Err(err) => debug!(%err, "unrecognised frame"),
                }
                println!("{text}");
            }
            _ = async {
                match ticker.as_mut() {
                    Some(ticker) => ticker.tick().await,
                    None => std::future::pending().await,
                }
            } => {
                let time = transport.time_at(Instant::now());
                let frame = InboundFrame::Update { time: Some(time) };
                if let Err(err) = writer.send(Message::Text(serde_json::to_string(&frame)?)).await {
                    warn!(%err, "failed to send clock update");
                    break;
                }
            }
        }
    }

    let _ = writer.close().await;
    Ok(())
}
