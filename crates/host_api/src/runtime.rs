//! The host event loop.

use boundary::HostEnd;
use shared::protocol::UiCommand;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::router::{CloseOutcome, CommandRouter};

/// Events raised by the window collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    CloseRequested,
    /// A menu or accelerator action to forward to the UI context.
    Menu(UiCommand),
}

/// Serves the boundary until the window is destroyed or every lane closes.
///
/// Requests and close handling run as their own tasks so a pending prompt
/// never stalls the loop. Notifications are applied in arrival order.
pub async fn run(
    router: CommandRouter,
    mut host: HostEnd,
    mut window_events: mpsc::UnboundedReceiver<WindowEvent>,
) {
    let closing = router.closing();
    info!(ui_context = host.ui_context.0, "host loop started");

    loop {
        tokio::select! {
            _ = closing.cancelled() => break,
            Some(envelope) = host.requests.recv() => {
                debug!(command = envelope.request.command_name(), "host request received");
                let router = router.clone();
                tokio::spawn(async move { router.dispatch(envelope).await });
            }
            Some(envelope) = host.notifications.recv() => {
                router.notify(envelope).await;
            }
            Some(event) = window_events.recv() => match event {
                WindowEvent::CloseRequested => {
                    let router = router.clone();
                    tokio::spawn(async move {
                        if router.request_close().await == CloseOutcome::Suppressed {
                            debug!("close request declined by user");
                        }
                    });
                }
                WindowEvent::Menu(command) => {
                    if let Err(err) = host.commands.send(command) {
                        warn!(%err, "ui context is gone; dropping menu action");
                    }
                }
            },
            else => break,
        }
    }

    info!("host loop stopped");
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
