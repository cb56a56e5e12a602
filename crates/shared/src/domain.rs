use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

// Identity of one end of the process boundary. The host trusts exactly one.
id_newtype!(ContextId);

pub const APP_TITLE: &str = "Automaton";

/// A destructive action that may need the user to confirm losing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestructiveAction {
    NewDocument,
    OpenFile,
    CloseWindow,
}

impl DestructiveAction {
    pub fn warning(self) -> &'static str {
        match self {
            DestructiveAction::NewDocument => {
                "You are going to make a new project.\nAre you sure? You are going to lose your current changes!"
            }
            DestructiveAction::OpenFile => {
                "You are going to open a file.\nAre you sure? You will lose your current changes after opening a file!"
            }
            DestructiveAction::CloseWindow => {
                "You are going to close the window.\nAre you sure? You are going to lose your current changes!"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Cancel,
}

/// File-picker filter for the document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            name: "Automaton JSON File".into(),
            extensions: vec!["json".into()],
        }
    }
}
