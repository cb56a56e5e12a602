//! The animation engine as seen from the UI context.

use std::collections::BTreeMap;

use thiserror::Error;
use tokio::sync::mpsc;

/// Lifecycle events an engine reports to its subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    Play,
    Pause,
    /// The user moved the playhead from the editor itself.
    Seek { time: f64 },
    DirtyChanged { dirty: bool },
}

pub type EngineEventSink = mpsc::UnboundedSender<EngineEvent>;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct DocumentError(pub String);

/// Curve evaluation, editing history and the document model live behind
/// this trait; the orchestrator only drives it.
pub trait AnimationEngine: Send {
    fn serialize(&self) -> String;
    fn deserialize(&mut self, data: &str) -> Result<(), DocumentError>;
    /// Replaces the document with a blank one.
    fn load_empty(&mut self);

    fn play(&mut self);
    fn pause(&mut self);
    /// Marks `channel` as driven by the remote controller.
    fn auto(&mut self, channel: &str);

    /// Time of the last evaluation.
    fn time(&self) -> f64;
    fn evaluate(&mut self, time: f64);
    /// Clears accumulated evaluation state before moving backwards.
    fn reset(&mut self);
    fn channel_values(&self) -> BTreeMap<String, f64>;

    fn should_save(&self) -> bool;
    /// Records `written` as the document on disk. Edits not contained in
    /// it keep the engine dirty.
    fn mark_saved(&mut self, written: &str);
    fn undo(&mut self);
    fn redo(&mut self);
    fn toast(&mut self, message: &str);

    fn subscribe(&mut self, sink: EngineEventSink);
}
