//! UI-side wiring between the host boundary, the remote controller and the engine.

use std::time::Duration;

use boundary::HostClient;
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use shared::{
    error::ControlError,
    protocol::{CommandResponse, HostNotification, HostRequest, InboundFrame, OutboundFrame, UiCommand},
};
use tokio::{
    sync::mpsc,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{AnimationEngine, EngineEvent};

pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_micros(16_667);

const OPEN_FAILED: &str = "An error has occured while opening the file:\n";
const SAVED_TOAST: &str = "Saved!";

/// A host round trip started by a command, resolved on the orchestrator loop.
enum FileFlow {
    New(Result<CommandResponse, ControlError>),
    Open(Result<CommandResponse, ControlError>),
    Save {
        data: String,
        result: Result<CommandResponse, ControlError>,
    },
    RemoteControl {
        port: u16,
        result: Result<CommandResponse, ControlError>,
    },
}

pub struct Orchestrator<E> {
    engine: E,
    host: HostClient,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    in_flight: FuturesUnordered<BoxFuture<'static, FileFlow>>,
    time: f64,
}

impl<E: AnimationEngine> Orchestrator<E> {
    pub fn new(mut engine: E, host: HostClient) -> Self {
        let (sink, events) = mpsc::unbounded_channel();
        engine.subscribe(sink);
        let time = engine.time();
        Self {
            engine,
            host,
            events,
            in_flight: FuturesUnordered::new(),
            time,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The authoritative playback time.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<UiCommand>,
        redraw_interval: Duration,
        shutdown: CancellationToken,
    ) -> E {
        let mut redraw = interval(redraw_interval);
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(?redraw_interval, "ui orchestrator started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_engine_event(event),
                Some(flow) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.complete(flow);
                }
                _ = redraw.tick() => {
                    self.redraw();
                }
            }
        }

        info!("ui orchestrator stopped");
        self.engine
    }

    pub fn handle_command(&mut self, command: UiCommand) {
        match command {
            UiCommand::New => {
                let request = HostRequest::New {
                    dirty: self.engine.should_save(),
                };
                self.start(request, FileFlow::New);
            }
            UiCommand::Open => {
                let request = HostRequest::Open {
                    dirty: self.engine.should_save(),
                };
                self.start(request, FileFlow::Open);
            }
            UiCommand::Save => self.start_save(false),
            UiCommand::SaveAs => self.start_save(true),
            UiCommand::Undo => self.engine.undo(),
            UiCommand::Redo => self.engine.redo(),
            UiCommand::OpenRemoteControl { port } => {
                self.start(HostRequest::OpenServer { port }, move |result| {
                    FileFlow::RemoteControl { port, result }
                });
            }
            UiCommand::Remote(frame) => self.handle_frame(frame),
        }
    }

    pub fn handle_frame(&mut self, frame: InboundFrame) {
        match frame {
            InboundFrame::Update { time } => {
                let Some(time) = time.filter(|time| !time.is_nan()) else {
                    debug!("ignoring update without a usable time");
                    return;
                };
                self.time = time;
                self.redraw();
                let data = self.engine.channel_values();
                self.emit(OutboundFrame::Data { data });
            }
            InboundFrame::Play => self.engine.play(),
            InboundFrame::Pause => self.engine.pause(),
            InboundFrame::Auto { name } => self.engine.auto(&name),
        }
    }

    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Play => self.emit(OutboundFrame::Play),
            EngineEvent::Pause => self.emit(OutboundFrame::Pause),
            EngineEvent::Seek { time } => {
                // a seek from the editor moves the playhead for the next redraw too
                self.time = time;
                self.emit(OutboundFrame::Seek { time });
            }
            EngineEvent::DirtyChanged { dirty } => {
                self.notify(HostNotification::ChangeShouldSave { should_save: dirty });
            }
        }
    }

    /// Applies any engine events queued so far.
    pub fn drain_engine_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_engine_event(event);
        }
    }

    /// Brings the engine to the authoritative time. Returns `false` when it
    /// was already there.
    pub fn redraw(&mut self) -> bool {
        let evaluated = self.engine.time();
        if evaluated == self.time {
            return false;
        }
        if self.time < evaluated {
            self.engine.reset();
        }
        self.engine.evaluate(self.time);
        true
    }

    /// Waits for the oldest outstanding host round trip and applies it.
    pub async fn settle_next(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(flow) => {
                self.complete(flow);
                true
            }
            None => false,
        }
    }

    fn start_save(&mut self, save_as: bool) {
        let data = self.engine.serialize();
        let request = if save_as {
            HostRequest::SaveAs { data: data.clone() }
        } else {
            HostRequest::Save { data: data.clone() }
        };
        self.start(request, move |result| FileFlow::Save { data, result });
    }

    fn start<F>(&mut self, request: HostRequest, finish: F)
    where
        F: FnOnce(Result<CommandResponse, ControlError>) -> FileFlow + Send + 'static,
    {
        debug!(command = request.command_name(), "sending host request");
        let host = self.host.clone();
        self.in_flight
            .push(async move { finish(host.request(request).await) }.boxed());
    }

    fn complete(&mut self, flow: FileFlow) {
        match flow {
            FileFlow::New(result) => {
                if proceeded(result, "new") {
                    self.engine.load_empty();
                }
            }
            FileFlow::Open(result) => {
                let Some(response) = accepted(result, "open") else {
                    return;
                };
                match response.data {
                    Some(data) => {
                        if let Err(err) = self.engine.deserialize(&data) {
                            warn!(%err, "failed to load opened document");
                            self.notify(HostNotification::Error {
                                message: format!("{OPEN_FAILED}{err}"),
                            });
                        }
                    }
                    None => warn!("host accepted open without document data"),
                }
                // the host marked its session clean on read; a document that
                // failed to load leaves the old edits unsaved
                self.sync_should_save();
            }
            FileFlow::Save { data, result } => {
                if proceeded(result, "save") {
                    self.engine.mark_saved(&data);
                    self.engine.toast(SAVED_TOAST);
                    self.emit(OutboundFrame::Save { data });
                    // edits made while the dialog was open are not on disk
                    self.sync_should_save();
                }
            }
            FileFlow::RemoteControl { port, result } => {
                if proceeded(result, "openServer") {
                    info!(port, "remote control endpoint requested");
                }
            }
        }
    }

    fn sync_should_save(&self) {
        self.notify(HostNotification::ChangeShouldSave {
            should_save: self.engine.should_save(),
        });
    }

    fn emit(&self, frame: OutboundFrame) {
        self.notify(HostNotification::Remote(frame));
    }

    fn notify(&self, notification: HostNotification) {
        if let Err(err) = self.host.notify(notification) {
            debug!(%err, "host is gone; dropping notification");
        }
    }
}

fn accepted(result: Result<CommandResponse, ControlError>, command: &str) -> Option<CommandResponse> {
    match result {
        Ok(response) if response.canceled => {
            debug!(command, "host request canceled");
            None
        }
        Ok(response) => Some(response),
        Err(err) => {
            warn!(command, %err, "host request failed");
            None
        }
    }
}

fn proceeded(result: Result<CommandResponse, ControlError>, command: &str) -> bool {
    accepted(result, command).is_some()
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
