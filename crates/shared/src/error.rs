use thiserror::Error;

/// Failure taxonomy of the session/control layer.
///
/// None of these are fatal. Handlers either turn them into a canceled
/// [`CommandResponse`](crate::protocol::CommandResponse) plus a user-visible
/// notice, or drop the offending message without reporting it.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("operation canceled by user")]
    UserCanceled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame: {0}")]
    Decode(String),

    #[error("failed to encode frame: {0}")]
    Encode(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request from unexpected sender {0:?}")]
    UnauthorizedSender(crate::domain::ContextId),

    #[error("failed to bind remote control endpoint on port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },

    #[error("process boundary closed: {0}")]
    Boundary(&'static str),
}

impl ControlError {
    /// Silent failures are never shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            ControlError::UserCanceled
                | ControlError::Decode(_)
                | ControlError::UnauthorizedSender(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
