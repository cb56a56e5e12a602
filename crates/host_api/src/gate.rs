use std::sync::Arc;

use shared::domain::{Decision, DestructiveAction};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::collaborators::ModalPrompt;

pub const DISCARD_OPTIONS: [&str; 2] = ["Discard Changes", "Nope Nope Nope"];

/// Decides whether a destructive action may go ahead.
///
/// Clean sessions always proceed. Dirty ones ask the user, and only the
/// first option ("Discard Changes") proceeds. A prompt still pending when
/// `closing` fires resolves to [`Decision::Cancel`].
#[derive(Clone)]
pub struct ConfirmationGate {
    prompt: Arc<dyn ModalPrompt>,
    closing: CancellationToken,
}

impl ConfirmationGate {
    pub fn new(prompt: Arc<dyn ModalPrompt>, closing: CancellationToken) -> Self {
        Self { prompt, closing }
    }

    pub async fn confirm_destructive(&self, action: DestructiveAction, is_dirty: bool) -> Decision {
        if !is_dirty {
            return Decision::Proceed;
        }

        let choice = tokio::select! {
            _ = self.closing.cancelled() => {
                debug!(?action, "confirmation prompt canceled by window teardown");
                return Decision::Cancel;
            }
            choice = self.prompt.confirm(action.warning(), &DISCARD_OPTIONS) => choice,
        };

        if choice == 0 {
            Decision::Proceed
        } else {
            Decision::Cancel
        }
    }
}
