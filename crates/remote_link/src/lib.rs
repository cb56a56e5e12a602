//! Single-peer WebSocket bridge between a remote controller and the editor.
//!
//! The link is an actor: one task owns the listening socket and the active
//! peer, and everything else talks to it through [`RemoteLink`]. Inbound text
//! frames are decoded and pushed into the UI context in arrival order;
//! outbound frames are encoded and written to whichever peer is connected.

use std::{
    future::pending,
    io,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use async_trait::async_trait;
use boundary::UiCommandSender;
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use host_api::RemoteEndpoint;
use shared::{
    error::ControlError,
    protocol::{decode_inbound, encode_outbound, OutboundFrame, UiCommand},
};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message},
    WebSocketStream,
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Bound { port: u16 },
    Connected { port: u16, peer: SocketAddr },
}

enum LinkCommand {
    Open {
        port: u16,
        reply: oneshot::Sender<Result<u16, ControlError>>,
    },
    Send(OutboundFrame),
    Shutdown,
}

/// Handle on the link actor. Clones address the same actor.
#[derive(Clone)]
pub struct RemoteLink {
    commands: mpsc::UnboundedSender<LinkCommand>,
    state: watch::Receiver<LinkState>,
}

impl RemoteLink {
    /// Starts the actor. Decoded inbound frames go to `inbound` as
    /// [`UiCommand::Remote`].
    pub fn spawn(bind_host: IpAddr, inbound: UiCommandSender) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LinkState::Idle);
        let (handshake_tx, handshake_rx) = mpsc::unbounded_channel();

        let actor = LinkActor {
            bind_host,
            inbound,
            commands: command_rx,
            state: state_tx,
            listener: None,
            generation: 0,
            handshake_tx,
            handshakes: handshake_rx,
            connection: None,
            accept_failures: 0,
            accept_resume: None,
        };
        let task = tokio::spawn(actor.run());

        (
            Self {
                commands: command_tx,
                state: state_rx,
            },
            task,
        )
    }

    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state.clone()
    }

    /// Binds `port` (0 picks a free one), tearing down any previous endpoint.
    pub async fn open(&self, port: u16) -> Result<u16, ControlError> {
        let (reply, bound) = oneshot::channel();
        self.commands
            .send(LinkCommand::Open { port, reply })
            .map_err(|_| ControlError::Boundary("remote link stopped"))?;
        bound
            .await
            .map_err(|_| ControlError::Boundary("remote link stopped"))?
    }

    pub fn send(&self, frame: OutboundFrame) {
        if self.commands.send(LinkCommand::Send(frame)).is_err() {
            debug!("remote link stopped; dropping outbound frame");
        }
    }

    /// Closes the endpoint and any peer, then stops the actor.
    pub fn shutdown(&self) {
        let _ = self.commands.send(LinkCommand::Shutdown);
    }
}

#[async_trait]
impl RemoteEndpoint for RemoteLink {
    async fn open(&self, port: u16) -> Result<u16, ControlError> {
        RemoteLink::open(self, port).await
    }

    fn send(&self, frame: OutboundFrame) {
        RemoteLink::send(self, frame)
    }
}

type PeerStream = WebSocketStream<TcpStream>;

const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Delay before accepting again after `failures` consecutive accept errors.
fn accept_backoff(failures: u32) -> Duration {
    let shift = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1 << shift)
        .min(ACCEPT_BACKOFF_MAX)
}

struct Connection {
    peer: SocketAddr,
    reader: SplitStream<PeerStream>,
    writer: SplitSink<PeerStream, Message>,
}

struct Handshake {
    generation: u64,
    peer: SocketAddr,
    stream: PeerStream,
}

enum LinkEvent {
    Command(LinkCommand),
    Accepted(io::Result<(TcpStream, SocketAddr)>),
    Handshake(Handshake),
    Inbound(Option<Result<Message, WsError>>),
}

struct LinkActor {
    bind_host: IpAddr,
    inbound: UiCommandSender,
    commands: mpsc::UnboundedReceiver<LinkCommand>,
    state: watch::Sender<LinkState>,
    listener: Option<(TcpListener, u16)>,
    // bumped on every bind so handshakes from a replaced endpoint are discarded
    generation: u64,
    handshake_tx: mpsc::UnboundedSender<Handshake>,
    handshakes: mpsc::UnboundedReceiver<Handshake>,
    connection: Option<Connection>,
    accept_failures: u32,
    // accepting is paused until then after an accept error; commands keep flowing
    accept_resume: Option<Instant>,
}

impl LinkActor {
    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => LinkEvent::Command(command),
                    None => break,
                },
                accepted = accept_next(&self.listener, self.accept_resume) => {
                    LinkEvent::Accepted(accepted)
                }
                Some(handshake) = self.handshakes.recv() => LinkEvent::Handshake(handshake),
                message = read_next(&mut self.connection) => LinkEvent::Inbound(message),
            };

            match event {
                LinkEvent::Command(LinkCommand::Open { port, reply }) => {
                    let _ = reply.send(self.bind(port).await);
                }
                LinkEvent::Command(LinkCommand::Send(frame)) => self.write(frame).await,
                LinkEvent::Command(LinkCommand::Shutdown) => break,
                LinkEvent::Accepted(Ok((stream, peer))) => {
                    self.accept_failures = 0;
                    self.accept_resume = None;
                    self.start_handshake(stream, peer);
                }
                LinkEvent::Accepted(Err(err)) => self.accept_failed(err),
                LinkEvent::Handshake(handshake) => self.adopt(handshake).await,
                LinkEvent::Inbound(message) => self.receive(message).await,
            }
        }

        self.disconnect("link shut down").await;
        self.listener = None;
        self.state.send_replace(LinkState::Idle);
        info!("remote link stopped");
    }

    async fn bind(&mut self, port: u16) -> Result<u16, ControlError> {
        self.disconnect("endpoint replaced").await;
        self.listener = None;
        self.generation += 1;
        self.accept_failures = 0;
        self.accept_resume = None;

        let listener = match TcpListener::bind((self.bind_host, port)).await {
            Ok(listener) => listener,
            Err(source) => {
                self.state.send_replace(LinkState::Idle);
                return Err(ControlError::Bind { port, source });
            }
        };
        let bound = listener
            .local_addr()
            .map_err(|source| ControlError::Bind { port, source })?
            .port();

        info!(host = %self.bind_host, port = bound, "remote control endpoint bound");
        self.listener = Some((listener, bound));
        self.state.send_replace(LinkState::Bound { port: bound });
        Ok(bound)
    }

    fn accept_failed(&mut self, err: io::Error) {
        self.accept_failures = self.accept_failures.saturating_add(1);
        let delay = accept_backoff(self.accept_failures);
        warn!(%err, failures = self.accept_failures, ?delay, "remote control accept failed");
        self.accept_resume = Some(Instant::now() + delay);
    }

    fn start_handshake(&self, stream: TcpStream, peer: SocketAddr) {
        let generation = self.generation;
        let handshake_tx = self.handshake_tx.clone();
        tokio::spawn(async move {
            match accept_async(stream).await {
                Ok(stream) => {
                    let _ = handshake_tx.send(Handshake {
                        generation,
                        peer,
                        stream,
                    });
                }
                Err(err) => debug!(%peer, %err, "remote control handshake failed"),
            }
        });
    }

    async fn adopt(&mut self, handshake: Handshake) {
        let Some(port) = self.listener.as_ref().map(|(_, port)| *port) else {
            return;
        };
        if handshake.generation != self.generation {
            debug!(peer = %handshake.peer, "discarding handshake from a replaced endpoint");
            return;
        }

        self.disconnect("replaced by a new peer").await;
        let (writer, reader) = handshake.stream.split();
        self.connection = Some(Connection {
            peer: handshake.peer,
            reader,
            writer,
        });
        info!(peer = %handshake.peer, port, "remote peer connected");
        self.state.send_replace(LinkState::Connected {
            port,
            peer: handshake.peer,
        });
    }

    async fn receive(&mut self, message: Option<Result<Message, WsError>>) {
        match message {
            Some(Ok(Message::Text(text))) => match decode_inbound(&text) {
                Ok(frame) => {
                    if let Err(err) = self.inbound.send(UiCommand::Remote(frame)) {
                        warn!(%err, "ui context is gone; dropping inbound frame");
                    }
                }
                Err(err) => debug!(%err, "dropping malformed remote frame"),
            },
            Some(Ok(Message::Close(_))) | None => self.disconnect("peer closed").await,
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                warn!(%err, "remote transport error");
                self.disconnect("transport error").await;
            }
        }
    }

    async fn write(&mut self, frame: OutboundFrame) {
        let Some(connection) = self.connection.as_mut() else {
            debug!("no remote peer; dropping outbound frame");
            return;
        };
        let text = match encode_outbound(&frame) {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "failed to encode outbound frame");
                return;
            }
        };
        let sent = connection.writer.send(Message::Text(text)).await;
        if let Err(err) = sent {
            warn!(%err, "remote send failed");
            self.disconnect("send failed").await;
        }
    }

    /// Drops the active peer, if any, and falls back to listening.
    async fn disconnect(&mut self, reason: &str) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        let _ = connection.writer.close().await;
        info!(peer = %connection.peer, reason, "remote peer disconnected");

        let state = match &self.listener {
            Some((_, port)) => LinkState::Bound { port: *port },
            None => LinkState::Idle,
        };
        self.state.send_replace(state);
    }
}

async fn accept_next(
    listener: &Option<(TcpListener, u16)>,
    resume: Option<Instant>,
) -> io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some((listener, _)) => {
            if let Some(resume) = resume {
                sleep_until(resume).await;
            }
            listener.accept().await
        }
        None => pending().await,
    }
}

async fn read_next(connection: &mut Option<Connection>) -> Option<Result<Message, WsError>> {
    match connection {
        Some(connection) => connection.reader.next().await,
        None => pending().await,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
