use std::sync::Mutex;

use host_api::Window;
use shared::domain::APP_TITLE;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A window with no surface: the title goes to the log and destroying it
/// releases whoever waits on [`LogWindow::destroyed`].
pub struct LogWindow {
    title: Mutex<String>,
    destroyed: CancellationToken,
}

impl Default for LogWindow {
    fn default() -> Self {
        Self {
            title: Mutex::new(APP_TITLE.to_string()),
            destroyed: CancellationToken::new(),
        }
    }
}

impl LogWindow {
    pub fn title(&self) -> String {
        match self.title.lock() {
            Ok(title) => title.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn destroyed(&self) -> CancellationToken {
        self.destroyed.clone()
    }
}

impl Window for LogWindow {
    fn set_title(&self, title: &str) {
        info!(title, "window title");
        match self.title.lock() {
            Ok(mut current) => *current = title.to_string(),
            Err(poisoned) => *poisoned.into_inner() = title.to_string(),
        }
    }

    fn destroy(&self) {
        self.destroyed.cancel();
    }
}
