//! Typed channels between the privileged host context and the UI context.
//!
//! Three lanes cross the boundary:
//! - UI -> host requests, each paired with a one-shot reply,
//! - UI -> host notifications, never answered,
//! - host -> UI commands.
//!
//! Every UI -> host envelope carries the [`ContextId`] of the sender. The
//! host decides what to trust; this crate only delivers.

use shared::{
    domain::ContextId,
    error::ControlError,
    protocol::{CommandResponse, HostNotification, HostRequest, UiCommand},
};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

#[derive(Debug)]
pub struct RequestEnvelope {
    pub sender: ContextId,
    pub request: HostRequest,
    reply: oneshot::Sender<CommandResponse>,
}

impl RequestEnvelope {
    pub fn respond(self, response: CommandResponse) {
        if self.reply.send(response).is_err() {
            debug!(
                command = self.request.command_name(),
                "requester went away before the response arrived"
            );
        }
    }

    /// Consumes the envelope without answering it.
    pub fn drop_unanswered(self) {
        debug!(
            command = self.request.command_name(),
            sender = self.sender.0,
            "request dropped without response"
        );
    }
}

#[derive(Debug, Clone)]
pub struct NotificationEnvelope {
    pub sender: ContextId,
    pub notification: HostNotification,
}

/// The host's half of the boundary.
pub struct HostEnd {
    pub ui_context: ContextId,
    pub requests: mpsc::UnboundedReceiver<RequestEnvelope>,
    pub notifications: mpsc::UnboundedReceiver<NotificationEnvelope>,
    pub commands: UiCommandSender,
}

/// The UI's half of the boundary.
pub struct UiEnd {
    pub client: HostClient,
    pub commands: mpsc::UnboundedReceiver<UiCommand>,
}

pub fn channel(ui_context: ContextId) -> (HostEnd, UiEnd) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (notification_tx, notification_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let host = HostEnd {
        ui_context,
        requests: request_rx,
        notifications: notification_rx,
        commands: UiCommandSender { tx: command_tx },
    };
    let ui = UiEnd {
        client: HostClient {
            context: ui_context,
            requests: request_tx,
            notifications: notification_tx,
        },
        commands: command_rx,
    };
    (host, ui)
}

/// Sends requests and notifications to the host on behalf of one context.
#[derive(Clone)]
pub struct HostClient {
    context: ContextId,
    requests: mpsc::UnboundedSender<RequestEnvelope>,
    notifications: mpsc::UnboundedSender<NotificationEnvelope>,
}

impl HostClient {
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// A client for another sender sharing the same host lanes.
    pub fn attach(&self, context: ContextId) -> HostClient {
        HostClient {
            context,
            requests: self.requests.clone(),
            notifications: self.notifications.clone(),
        }
    }

    /// Sends `request` and waits for the host to answer it.
    ///
    /// Returns [`ControlError::Boundary`] if the host is gone or drops the
    /// request without answering. Callers that need a deadline wrap this in
    /// their own timeout.
    pub async fn request(&self, request: HostRequest) -> Result<CommandResponse, ControlError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(RequestEnvelope {
                sender: self.context,
                request,
                reply,
            })
            .map_err(|_| ControlError::Boundary("host request lane closed"))?;
        response
            .await
            .map_err(|_| ControlError::Boundary("request dropped without response"))
    }

    pub fn notify(&self, notification: HostNotification) -> Result<(), ControlError> {
        self.notifications
            .send(NotificationEnvelope {
                sender: self.context,
                notification,
            })
            .map_err(|_| ControlError::Boundary("host notification lane closed"))
    }
}

#[derive(Clone)]
pub struct UiCommandSender {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiCommandSender {
    pub fn send(&self, command: UiCommand) -> Result<(), ControlError> {
        self.tx
            .send(command)
            .map_err(|_| ControlError::Boundary("ui command lane closed"))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
