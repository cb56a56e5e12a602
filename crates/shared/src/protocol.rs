use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// Requests the UI context sends to the host and awaits a [`CommandResponse`] for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum HostRequest {
    New { dirty: bool },
    Open { dirty: bool },
    Save { data: String },
    SaveAs { data: String },
    OpenServer { port: u16 },
}

impl HostRequest {
    pub fn command_name(&self) -> &'static str {
        match self {
            HostRequest::New { .. } => "new",
            HostRequest::Open { .. } => "open",
            HostRequest::Save { .. } => "save",
            HostRequest::SaveAs { .. } => "saveAs",
            HostRequest::OpenServer { .. } => "openServer",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub canceled: bool,
    #[serde(default)]
    pub data: Option<String>,
}

impl CommandResponse {
    pub fn done() -> Self {
        Self::default()
    }

    pub fn canceled() -> Self {
        Self {
            canceled: true,
            data: None,
        }
    }

    pub fn with_data(data: String) -> Self {
        Self {
            canceled: false,
            data: Some(data),
        }
    }
}

/// Fire-and-forget messages from the UI context to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum HostNotification {
    Error {
        message: String,
    },
    ChangeShouldSave {
        #[serde(rename = "shouldSave")]
        should_save: bool,
    },
    #[serde(rename = "ws")]
    Remote(OutboundFrame),
}

/// Commands the host pushes into the UI context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum UiCommand {
    New,
    Open,
    Save,
    SaveAs,
    Undo,
    Redo,
    OpenRemoteControl { port: u16 },
    #[serde(rename = "ws")]
    Remote(InboundFrame),
}

/// Frames a remote controller sends to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    Update {
        #[serde(default)]
        time: Option<f64>,
    },
    Play,
    Pause,
    Auto {
        name: String,
    },
}

/// Frames the editor sends to a remote controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Play,
    Pause,
    Seek { time: f64 },
    Save { data: String },
    Data { data: BTreeMap<String, f64> },
}

pub fn decode_inbound(raw: &str) -> Result<InboundFrame, ControlError> {
    serde_json::from_str(raw).map_err(|err| ControlError::Decode(err.to_string()))
}

pub fn encode_outbound(frame: &OutboundFrame) -> Result<String, ControlError> {
    serde_json::to_string(frame).map_err(|err| ControlError::Encode(err.to_string()))
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
