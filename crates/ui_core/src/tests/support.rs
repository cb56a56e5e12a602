//! A recording engine fake.

use std::collections::BTreeMap;

use crate::engine::{AnimationEngine, DocumentError, EngineEvent, EngineEventSink};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Deserialize(String),
    LoadEmpty,
    Play,
    Pause,
    Auto(String),
    Evaluate(f64),
    Reset,
    MarkSaved(String),
    Undo,
    Redo,
    Toast(String),
}

#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    pub time: f64,
    pub dirty: bool,
    pub document: String,
    pub channels: BTreeMap<String, f64>,
    pub sink: Option<EngineEventSink>,
}

impl RecordingEngine {
    pub fn with_document(document: &str) -> Self {
        Self {
            document: document.to_string(),
            ..Self::default()
        }
    }

    pub fn evaluations(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Evaluate(_) | Call::Reset))
            .collect()
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = &self.sink {
            let _ = sink.send(event);
        }
    }
}

impl AnimationEngine for RecordingEngine {
    fn serialize(&self) -> String {
        self.document.clone()
    }

    fn deserialize(&mut self, data: &str) -> Result<(), DocumentError> {
        self.calls.push(Call::Deserialize(data.to_string()));
        if !data.trim_start().starts_with('{') {
            return Err(DocumentError("expected a JSON object".into()));
        }
        self.document = data.to_string();
        self.dirty = false;
        Ok(())
    }

    fn load_empty(&mut self) {
        self.calls.push(Call::LoadEmpty);
        self.document = "{}".into();
    }

    fn play(&mut self) {
        self.calls.push(Call::Play);
        self.emit(EngineEvent::Play);
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
        self.emit(EngineEvent::Pause);
    }

    fn auto(&mut self, channel: &str) {
        self.calls.push(Call::Auto(channel.to_string()));
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn evaluate(&mut self, time: f64) {
        self.calls.push(Call::Evaluate(time));
        self.time = time;
        for value in self.channels.values_mut() {
            *value = time * 2.0;
        }
    }

    fn reset(&mut self) {
        self.calls.push(Call::Reset);
        self.time = 0.0;
    }

    fn channel_values(&self) -> BTreeMap<String, f64> {
        self.channels.clone()
    }

    fn should_save(&self) -> bool {
        self.dirty
    }

    fn mark_saved(&mut self, written: &str) {
        self.calls.push(Call::MarkSaved(written.to_string()));
        self.dirty = self.document != written;
    }

    fn undo(&mut self) {
        self.calls.push(Call::Undo);
    }

    fn redo(&mut self) {
        self.calls.push(Call::Redo);
    }

    fn toast(&mut self, message: &str) {
        self.calls.push(Call::Toast(message.to_string()));
    }

    fn subscribe(&mut self, sink: EngineEventSink) {
        self.sink = Some(sink);
    }
}
