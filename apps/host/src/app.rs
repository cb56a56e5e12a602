//! Assembles the host, the UI context and the remote link into one editor.

use std::sync::Arc;

use anyhow::Context;
use host_api::{
    CommandRouter, FilePicker, HostContext, ModalPrompt, TokioFileSystem, WindowEvent,
};
use remote_link::RemoteLink;
use shared::{
    domain::{ContextId, DocumentFilter},
    protocol::UiCommand,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use ui_core::{AnimationEngine, Orchestrator};

use crate::{
    config::Settings,
    dialogs::{NativeDialogs, ScriptedDialogs},
    scene::SceneEngine,
    window::LogWindow,
};

/// The only context trusted to issue host requests.
pub const UI_CONTEXT: ContextId = ContextId(1);

pub struct Editor {
    router: CommandRouter,
    link: RemoteLink,
    window: Arc<LogWindow>,
    window_events: mpsc::UnboundedSender<WindowEvent>,
    ui_shutdown: CancellationToken,
    host_task: JoinHandle<()>,
    ui_task: JoinHandle<SceneEngine>,
    link_task: JoinHandle<()>,
}

impl Editor {
    /// Spawns every task of the editor on the current runtime.
    pub fn start(settings: &Settings) -> Self {
        let (host_end, ui_end) = boundary::channel(UI_CONTEXT);
        let (link, link_task) = RemoteLink::spawn(settings.remote_bind_host, host_end.commands.clone());

        let (picker, prompt) = dialogs(settings);

        let window = Arc::new(LogWindow::default());
        let router = CommandRouter::new(
            HostContext {
                files: Arc::new(TokioFileSystem),
                picker,
                prompt,
                window: window.clone(),
                remote: Arc::new(link.clone()),
                filter: DocumentFilter::default(),
            },
            UI_CONTEXT,
        );

        let (window_events, window_rx) = mpsc::unbounded_channel();
        let host_task = tokio::spawn(host_api::run(router.clone(), host_end, window_rx));

        let ui_shutdown = CancellationToken::new();
        let orchestrator = Orchestrator::new(SceneEngine::default(), ui_end.client);
        let ui_task = tokio::spawn(orchestrator.run(
            ui_end.commands,
            settings.redraw_interval(),
            ui_shutdown.clone(),
        ));

        let editor = Self {
            router,
            link,
            window,
            window_events,
            ui_shutdown,
            host_task,
            ui_task,
            link_task,
        };
        if let Some(port) = settings.remote_port {
            editor.menu(UiCommand::OpenRemoteControl { port });
        }
        info!(headless = settings.headless, "editor started");
        editor
    }

    pub fn link(&self) -> &RemoteLink {
        &self.link
    }

    pub fn window(&self) -> &LogWindow {
        &self.window
    }

    /// Forwards a menu action to the UI context, as the native menu would.
    pub fn menu(&self, command: UiCommand) {
        if self.window_events.send(WindowEvent::Menu(command)).is_err() {
            debug!("host loop stopped; dropping menu action");
        }
    }

    pub fn request_close(&self) {
        if self.window_events.send(WindowEvent::CloseRequested).is_err() {
            debug!("host loop stopped; dropping close request");
        }
    }

    /// Resolves once the window has been destroyed.
    pub async fn closed(&self) {
        self.window.destroyed().cancelled().await;
    }

    /// Stops every task, whether or not the window was closed first.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.router.closing().cancel();
        self.ui_shutdown.cancel();
        self.link.shutdown();

        self.host_task.await.context("host loop panicked")?;
        let engine = self.ui_task.await.context("ui loop panicked")?;
        self.link_task.await.context("remote link panicked")?;

        info!(unsaved = engine.should_save(), "editor stopped");
        Ok(())
    }
}

fn dialogs(settings: &Settings) -> (Arc<dyn FilePicker>, Arc<dyn ModalPrompt>) {
    if settings.headless {
        // nobody is around to answer, so prompts discard
        let scripted = Arc::new(ScriptedDialogs::new(settings.document.clone(), true));
        let picker: Arc<dyn FilePicker> = scripted.clone();
        let prompt: Arc<dyn ModalPrompt> = scripted;
        (picker, prompt)
    } else {
        let picker: Arc<dyn FilePicker> = Arc::new(NativeDialogs);
        let prompt: Arc<dyn ModalPrompt> = Arc::new(NativeDialogs);
        (picker, prompt)
    }
}
