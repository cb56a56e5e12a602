use std::path::{Path, PathBuf};

use shared::domain::APP_TITLE;

/// Identity and save state of the document shown in the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    document_path: Option<PathBuf>,
    dirty: bool,
}

impl Session {
    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.document_path = Some(path.into());
    }

    pub fn clear_path(&mut self) {
        self.document_path = None;
    }

    pub fn current_title(&self) -> String {
        let mut title = match &self.document_path {
            Some(path) => format!("{} - {APP_TITLE}", path.display()),
            None => APP_TITLE.to_string(),
        };
        if self.dirty {
            title.insert_str(0, "* ");
        }
        title
    }
}
