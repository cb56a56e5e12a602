//! Host-side session control: document state, destructive-action gating,
//! and the command router that serves the UI context.

pub mod collaborators;
pub mod gate;
pub mod router;
pub mod runtime;
pub mod session;

pub use collaborators::{
    FilePicker, FileSystem, ModalPrompt, RemoteEndpoint, TokioFileSystem, Window,
};
pub use gate::{ConfirmationGate, DISCARD_OPTIONS};
pub use router::{CloseOutcome, CommandRouter, HostContext};
pub use runtime::{run, WindowEvent};
pub use session::Session;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
