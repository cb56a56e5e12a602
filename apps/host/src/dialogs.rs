//! Native dialogs through `rfd`, and scripted stand-ins for headless runs.

use std::path::PathBuf;

use async_trait::async_trait;
use host_api::{FilePicker, ModalPrompt};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use shared::domain::{DocumentFilter, APP_TITLE};
use tokio::task;
use tracing::{error, info, warn};

/// Blocking `rfd` dialogs run on the blocking pool.
///
/// A native dialog cannot be closed from outside. When window teardown
/// cancels a pending prompt the dialog stays up until the user answers it,
/// and that answer is discarded.
pub struct NativeDialogs;

#[async_trait]
impl FilePicker for NativeDialogs {
    async fn choose_open(&self, filter: &DocumentFilter) -> Option<PathBuf> {
        let filter = filter.clone();
        task::spawn_blocking(move || {
            FileDialog::new()
                .add_filter(&filter.name, filter.extensions.as_slice())
                .pick_file()
        })
        .await
        .unwrap_or_else(|err| {
            warn!(%err, "open dialog task failed");
            None
        })
    }

    async fn choose_save(&self, filter: &DocumentFilter) -> Option<PathBuf> {
        let filter = filter.clone();
        task::spawn_blocking(move || {
            FileDialog::new()
                .add_filter(&filter.name, filter.extensions.as_slice())
                .save_file()
        })
        .await
        .unwrap_or_else(|err| {
            warn!(%err, "save dialog task failed");
            None
        })
    }
}

#[async_trait]
impl ModalPrompt for NativeDialogs {
    async fn confirm(&self, message: &str, options: &[&str]) -> usize {
        let labels: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        let message = message.to_string();
        let cancel = options.len().saturating_sub(1);

        let picked = task::spawn_blocking(move || {
            let buttons = match labels.as_slice() {
                [proceed, keep, ..] => MessageButtons::OkCancelCustom(proceed.clone(), keep.clone()),
                [only] => MessageButtons::OkCustom(only.clone()),
                [] => MessageButtons::Ok,
            };
            let result = MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title(APP_TITLE)
                .set_description(message)
                .set_buttons(buttons)
                .show();
            match result {
                MessageDialogResult::Custom(label) => labels.iter().position(|l| *l == label),
                MessageDialogResult::Ok | MessageDialogResult::Yes => Some(0),
                _ => None,
            }
        })
        .await;

        match picked {
            Ok(Some(index)) => index,
            Ok(None) => cancel,
            Err(err) => {
                warn!(%err, "confirmation dialog task failed");
                cancel
            }
        }
    }

    async fn show_error(&self, message: &str) {
        let message = message.to_string();
        if let Err(err) = task::spawn_blocking(move || show_error_dialog(message)).await {
            warn!(%err, "error dialog task failed");
        }
    }

    fn notify_error(&self, message: &str) {
        let message = message.to_string();
        task::spawn_blocking(move || show_error_dialog(message));
    }
}

fn show_error_dialog(message: String) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(APP_TITLE)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Answers every dialog from settings instead of asking anyone.
pub struct ScriptedDialogs {
    document: Option<PathBuf>,
    discard: bool,
}

impl ScriptedDialogs {
    /// `document` is picked for both open and save; `discard` answers
    /// confirmation prompts.
    pub fn new(document: Option<PathBuf>, discard: bool) -> Self {
        Self { document, discard }
    }
}

#[async_trait]
impl FilePicker for ScriptedDialogs {
    async fn choose_open(&self, _filter: &DocumentFilter) -> Option<PathBuf> {
        self.document.clone()
    }

    async fn choose_save(&self, _filter: &DocumentFilter) -> Option<PathBuf> {
        self.document.clone()
    }
}

#[async_trait]
impl ModalPrompt for ScriptedDialogs {
    async fn confirm(&self, message: &str, options: &[&str]) -> usize {
        let answer = if self.discard {
            0
        } else {
            options.len().saturating_sub(1)
        };
        info!(message, answer = options.get(answer).copied().unwrap_or_default(), "auto-answered prompt");
        answer
    }

    async fn show_error(&self, message: &str) {
        error!(message, "error dialog");
    }

    fn notify_error(&self, message: &str) {
        error!(message, "error reported by ui");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_api::DISCARD_OPTIONS;

    #[tokio::test]
    async fn scripted_dialogs_pick_configured_document() {
        let dialogs = ScriptedDialogs::new(Some(PathBuf::from("/tmp/scene.json")), false);
        let filter = DocumentFilter::default();

        assert_eq!(
            dialogs.choose_open(&filter).await,
            Some(PathBuf::from("/tmp/scene.json"))
        );
        assert_eq!(
            dialogs.choose_save(&filter).await,
            Some(PathBuf::from("/tmp/scene.json"))
        );
    }

    #[tokio::test]
    async fn scripted_dialogs_keep_changes_unless_told_to_discard() {
        let keep = ScriptedDialogs::new(None, false);
        let discard = ScriptedDialogs::new(None, true);

        assert_eq!(keep.confirm("sure?", &DISCARD_OPTIONS).await, 1);
        assert_eq!(discard.confirm("sure?", &DISCARD_OPTIONS).await, 0);
    }
}
