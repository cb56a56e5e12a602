//! A small linear-channel engine for running the editor without a renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ui_core::{AnimationEngine, DocumentError, EngineEvent, EngineEventSink};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Loop length in seconds; 0 plays forever.
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "unit_slope")]
    pub slope: f64,
}

fn unit_slope() -> f64 {
    1.0
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            offset: 0.0,
            slope: unit_slope(),
        }
    }
}

#[derive(Default)]
pub struct SceneEngine {
    scene: Scene,
    saved: Scene,
    undo: Vec<Scene>,
    redo: Vec<Scene>,
    time: f64,
    playing: bool,
    dirty: bool,
    sink: Option<EngineEventSink>,
}

impl SceneEngine {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = &self.sink {
            let _ = sink.send(event);
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut Scene)) {
        self.undo.push(self.scene.clone());
        self.redo.clear();
        change(&mut self.scene);
        self.refresh_dirty();
    }

    fn replace(&mut self, scene: Scene) {
        self.scene = scene.clone();
        self.saved = scene;
        self.undo.clear();
        self.redo.clear();
        self.time = 0.0;
        self.refresh_dirty();
    }

    fn refresh_dirty(&mut self) {
        let dirty = self.scene != self.saved;
        if dirty != self.dirty {
            self.dirty = dirty;
            self.emit(EngineEvent::DirtyChanged { dirty });
        }
    }

    fn local_time(&self) -> f64 {
        if self.scene.length > 0.0 {
            self.time.rem_euclid(self.scene.length)
        } else {
            self.time
        }
    }
}

impl AnimationEngine for SceneEngine {
    fn serialize(&self) -> String {
        serde_json::to_string(&self.scene).unwrap_or_else(|err| {
            warn!(%err, "failed to serialize scene");
            String::from("{}")
        })
    }

    fn deserialize(&mut self, data: &str) -> Result<(), DocumentError> {
        let scene: Scene =
            serde_json::from_str(data).map_err(|err| DocumentError(err.to_string()))?;
        info!(channels = scene.channels.len(), "scene loaded");
        self.replace(scene);
        Ok(())
    }

    fn load_empty(&mut self) {
        self.replace(Scene::default());
    }

    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.emit(EngineEvent::Play);
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.emit(EngineEvent::Pause);
        }
    }

    fn auto(&mut self, channel: &str) {
        if self.scene.channels.contains_key(channel) {
            return;
        }
        let name = channel.to_string();
        self.edit(|scene| {
            scene.channels.insert(name, Channel::default());
        });
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn evaluate(&mut self, time: f64) {
        self.time = time;
    }

    fn reset(&mut self) {
        self.time = 0.0;
    }

    fn channel_values(&self) -> BTreeMap<String, f64> {
        let t = self.local_time();
        self.scene
            .channels
            .iter()
            .map(|(name, channel)| (name.clone(), channel.offset + channel.slope * t))
            .collect()
    }

    fn should_save(&self) -> bool {
        self.dirty
    }

    fn mark_saved(&mut self, written: &str) {
        match serde_json::from_str::<Scene>(written) {
            Ok(scene) => self.saved = scene,
            Err(err) => warn!(%err, "saved document is not a scene; keeping previous baseline"),
        }
        self.refresh_dirty();
    }

    fn undo(&mut self) {
        if let Some(previous) = self.undo.pop() {
            self.redo.push(std::mem::replace(&mut self.scene, previous));
            self.refresh_dirty();
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.redo.pop() {
            self.undo.push(std::mem::replace(&mut self.scene, next));
            self.refresh_dirty();
        }
    }

    fn toast(&mut self, message: &str) {
        info!(message, "toast");
    }

    fn subscribe(&mut self, sink: EngineEventSink) {
        self.sink = Some(sink);
    }
}
