//! The editor's UI context: drives an [`AnimationEngine`] from host commands,
//! remote frames and a redraw clock.

pub mod engine;
pub mod orchestrator;

pub use engine::{AnimationEngine, DocumentError, EngineEvent, EngineEventSink};
pub use orchestrator::{Orchestrator, DEFAULT_REDRAW_INTERVAL};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
