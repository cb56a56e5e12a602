use std::{path::PathBuf, sync::Arc};

use boundary::{NotificationEnvelope, RequestEnvelope};
use shared::{
    domain::{ContextId, Decision, DestructiveAction, DocumentFilter},
    protocol::{CommandResponse, HostNotification, HostRequest},
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    collaborators::{FilePicker, FileSystem, ModalPrompt, RemoteEndpoint, Window},
    gate::ConfirmationGate,
    session::Session,
};

#[derive(Clone)]
pub struct HostContext {
    pub files: Arc<dyn FileSystem>,
    pub picker: Arc<dyn FilePicker>,
    pub prompt: Arc<dyn ModalPrompt>,
    pub window: Arc<dyn Window>,
    pub remote: Arc<dyn RemoteEndpoint>,
    pub filter: DocumentFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Suppressed,
    Destroyed,
}

/// Host-side dispatcher for everything the UI context asks of the host.
///
/// Cheap to clone; clones share one [`Session`]. The session lock is only
/// held for reads and writes of the session itself, never across a prompt,
/// dialog, or file operation.
#[derive(Clone)]
pub struct CommandRouter {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    ctx: HostContext,
    ui_context: ContextId,
    session: Mutex<Session>,
    gate: ConfirmationGate,
    closing: CancellationToken,
}

impl CommandRouter {
    pub fn new(ctx: HostContext, ui_context: ContextId) -> Self {
        let closing = CancellationToken::new();
        let gate = ConfirmationGate::new(Arc::clone(&ctx.prompt), closing.clone());
        let router = Self {
            inner: Arc::new(RouterInner {
                ctx,
                ui_context,
                session: Mutex::new(Session::default()),
                gate,
                closing,
            }),
        };
        router.inner.ctx.window.set_title(&Session::default().current_title());
        router
    }

    pub async fn session(&self) -> Session {
        self.inner.session.lock().await.clone()
    }

    /// Fires once the window has been torn down.
    pub fn closing(&self) -> CancellationToken {
        self.inner.closing.clone()
    }

    fn is_trusted(&self, sender: ContextId) -> bool {
        sender == self.inner.ui_context
    }

    /// Runs an enveloped request and answers it, unless the sender is not
    /// the UI context, in which case the request is dropped unanswered.
    pub async fn dispatch(&self, envelope: RequestEnvelope) {
        if !self.is_trusted(envelope.sender) {
            debug!(
                sender = envelope.sender.0,
                command = envelope.request.command_name(),
                "ignoring request from unexpected sender"
            );
            envelope.drop_unanswered();
            return;
        }

        let response = self.execute(envelope.request.clone()).await;
        envelope.respond(response);
    }

    pub async fn notify(&self, envelope: NotificationEnvelope) {
        if !self.is_trusted(envelope.sender) {
            debug!(
                sender = envelope.sender.0,
                "ignoring notification from unexpected sender"
            );
            return;
        }

        match envelope.notification {
            HostNotification::Error { message } => self.inner.ctx.prompt.notify_error(&message),
            HostNotification::ChangeShouldSave { should_save } => {
                let mut session = self.inner.session.lock().await;
                session.set_dirty(should_save);
                self.inner.ctx.window.set_title(&session.current_title());
            }
            HostNotification::Remote(frame) => self.inner.ctx.remote.send(frame),
        }
    }

    pub async fn execute(&self, request: HostRequest) -> CommandResponse {
        match request {
            HostRequest::New { dirty } => self.new_document(dirty).await,
            HostRequest::Open { dirty } => self.open_document(dirty).await,
            HostRequest::Save { data } => self.save(data).await,
            HostRequest::SaveAs { data } => self.save_as(data).await,
            HostRequest::OpenServer { port } => self.open_server(port).await,
        }
    }

    pub async fn new_document(&self, dirty: bool) -> CommandResponse {
        if self
            .inner
            .gate
            .confirm_destructive(DestructiveAction::NewDocument, dirty)
            .await
            == Decision::Cancel
        {
            return CommandResponse::canceled();
        }

        let mut session = self.inner.session.lock().await;
        session.clear_path();
        session.mark_clean();
        self.inner.ctx.window.set_title(&session.current_title());
        info!("started new document");
        CommandResponse::done()
    }

    pub async fn open_document(&self, dirty: bool) -> CommandResponse {
        if self
            .inner
            .gate
            .confirm_destructive(DestructiveAction::OpenFile, dirty)
            .await
            == Decision::Cancel
        {
            return CommandResponse::canceled();
        }

        let Some(path) = self.inner.ctx.picker.choose_open(&self.inner.ctx.filter).await else {
            return CommandResponse::canceled();
        };

        let data = match self.inner.ctx.files.read(&path).await {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read document");
                self.inner
                    .ctx
                    .prompt
                    .show_error(&format!("Failed to read {}:\n{err}", path.display()))
                    .await;
                return CommandResponse::canceled();
            }
        };

        self.adopt_path(path).await;
        CommandResponse::with_data(data)
    }

    pub async fn save(&self, data: String) -> CommandResponse {
        let current = self.inner.session.lock().await.document_path().map(PathBuf::from);
        match current {
            Some(path) => self.write_to(path, &data).await,
            None => self.save_as(data).await,
        }
    }

    pub async fn save_as(&self, data: String) -> CommandResponse {
        let Some(path) = self.inner.ctx.picker.choose_save(&self.inner.ctx.filter).await else {
            return CommandResponse::canceled();
        };
        self.write_to(path, &data).await
    }

    async fn write_to(&self, path: PathBuf, data: &str) -> CommandResponse {
        if let Err(err) = self.inner.ctx.files.write(&path, data).await {
            warn!(path = %path.display(), %err, "failed to write document");
            self.inner
                .ctx
                .prompt
                .show_error(&format!("Failed to write {}:\n{err}", path.display()))
                .await;
            return CommandResponse::canceled();
        }

        self.adopt_path(path).await;
        CommandResponse::done()
    }

    async fn adopt_path(&self, path: PathBuf) {
        info!(path = %path.display(), "document path updated");
        let mut session = self.inner.session.lock().await;
        session.set_path(path);
        session.mark_clean();
        self.inner.ctx.window.set_title(&session.current_title());
    }

    pub async fn open_server(&self, port: u16) -> CommandResponse {
        match self.inner.ctx.remote.open(port).await {
            Ok(bound) => {
                info!(port = bound, "remote control listening");
                CommandResponse::done()
            }
            Err(err) => {
                warn!(port, %err, "failed to open remote control");
                self.inner.ctx.prompt.show_error(&err.to_string()).await;
                CommandResponse::canceled()
            }
        }
    }

    /// Handles a close request from the window. Nothing is saved implicitly.
    pub async fn request_close(&self) -> CloseOutcome {
        let dirty = self.inner.session.lock().await.is_dirty();
        match self
            .inner
            .gate
            .confirm_destructive(DestructiveAction::CloseWindow, dirty)
            .await
        {
            Decision::Cancel => {
                info!("window close suppressed");
                CloseOutcome::Suppressed
            }
            Decision::Proceed => {
                self.inner.closing.cancel();
                self.inner.ctx.window.destroy();
                info!("window destroyed");
                CloseOutcome::Destroyed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
